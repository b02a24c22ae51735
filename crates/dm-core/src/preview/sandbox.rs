use std::fmt;

/// Capability granted to the isolated preview document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxCapability {
    SameOrigin,
    Scripts,
    Forms,
    TopNavigation,
    Popups,
}

impl SandboxCapability {
    pub fn token(&self) -> &'static str {
        match self {
            SandboxCapability::SameOrigin => "allow-same-origin",
            SandboxCapability::Scripts => "allow-scripts",
            SandboxCapability::Forms => "allow-forms",
            SandboxCapability::TopNavigation => "allow-top-navigation",
            SandboxCapability::Popups => "allow-popups",
        }
    }
}

/// Explicit capability set of the preview surface.
/// 预览面的显式沙箱能力集合。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    capabilities: Vec<SandboxCapability>,
}

impl SandboxPolicy {
    /// Same-origin access, script execution and form submission; no
    /// navigation or top-level capability.
    pub fn preview() -> Self {
        Self {
            capabilities: vec![
                SandboxCapability::SameOrigin,
                SandboxCapability::Scripts,
                SandboxCapability::Forms,
            ],
        }
    }

    pub fn allows(&self, capability: SandboxCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn capabilities(&self) -> &[SandboxCapability] {
        &self.capabilities
    }
}

/// Renders as an iframe `sandbox` attribute value.
impl fmt::Display for SandboxPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.capabilities.iter().map(|c| c.token()).collect();
        write!(f, "{}", tokens.join(" "))
    }
}
