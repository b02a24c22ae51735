/// Printable candidate forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Application,
    Undertaking,
}

impl FormKind {
    fn stem(&self) -> &'static str {
        match self {
            FormKind::Application => "Job_Application_Form",
            FormKind::Undertaking => "Undertaking_Form",
        }
    }
}

/// `Job_Application_Form_<id>.pdf` / `Undertaking_Form_<id>.pdf`; `form` stands
/// in for a missing id.
pub fn form_filename(kind: FormKind, candidate_id: Option<&str>) -> String {
    let id = candidate_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or("form");
    format!("{}_{}.pdf", kind.stem(), sanitize(id))
}

/// Filename for a certificate export, derived from its display name.
pub fn certificate_filename(name: &str) -> String {
    let stem = sanitize(name.trim().trim_end_matches(".pdf"));
    let stem = if stem.is_empty() { "certificate".to_string() } else { stem };
    format!("{stem}.pdf")
}

// Keeps filenames portable: anything outside [A-Za-z0-9._-] becomes '_'.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
