use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, parse_fragment, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use dm_core::ports::{ImageElementPort, RenderedSubtreePort};
use dm_core::SubtreeId;

use super::image::{html_element_name, is_html_element, Attributes, MarkupImage};

/// Owned copy of the parsed tree; `<img>` elements live in the image list.
enum Node {
    Element {
        name: QualName,
        attrs: Attributes,
        children: Vec<Node>,
    },
    Image(usize),
    Text(String),
    Comment(String),
    Doctype(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// Markup parsed into an element tree with live image elements.
///
/// Input starting with `<!DOCTYPE` or `<html` is parsed as a whole document;
/// anything else as a fragment in `<body>` context, which is how a rendered
/// subtree's markup reads.
pub struct MarkupDocument {
    id: SubtreeId,
    nodes: Vec<Node>,
    images: Vec<Arc<MarkupImage>>,
    attached: Arc<AtomicBool>,
}

impl MarkupDocument {
    /// Parse `html`; every image starts in [`LoadState::Pending`](super::LoadState).
    pub fn parse(id: SubtreeId, html: impl Into<String>) -> Self {
        let html = html.into();
        let mut builder = TreeBuilder {
            images: Vec::new(),
            attached: Arc::new(AtomicBool::new(true)),
        };

        let nodes = if is_full_document(&html) {
            let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html.as_str());
            builder.children(&dom.document)
        } else {
            let dom = parse_fragment(
                RcDom::default(),
                ParseOpts::default(),
                html_element_name("body"),
                Vec::new(),
            )
            .one(html.as_str());
            // fragment nodes hang off a synthetic <html> root
            let root = dom.document.children.borrow().first().cloned();
            root.map(|root| builder.children(&root)).unwrap_or_default()
        };

        Self {
            id,
            nodes,
            images: builder.images,
            attached: builder.attached,
        }
    }

    /// Parse static markup whose images are already settled.
    pub fn parse_loaded(id: SubtreeId, html: impl Into<String>) -> Self {
        let document = Self::parse(id, html);
        document.mark_all_loaded();
        document
    }

    pub fn mark_all_loaded(&self) {
        for image in &self.images {
            image.mark_loaded();
        }
    }

    pub fn image(&self, index: usize) -> Option<&Arc<MarkupImage>> {
        self.images.get(index)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Remove the subtree from the page: further element access fails.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Serialized markup reflecting the current image sources.
    pub fn to_html(&self) -> Result<String> {
        let mut out = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut out, self, opts)
            .with_context(|| format!("serialize subtree {}", self.id))?;
        String::from_utf8(out).context("serialized markup is not utf-8")
    }

    fn write_nodes<S: Serializer>(&self, nodes: &[Node], serializer: &mut S) -> io::Result<()> {
        for node in nodes {
            match node {
                Node::Element {
                    name,
                    attrs,
                    children,
                } => {
                    serializer.start_elem(
                        name.clone(),
                        attrs.iter().map(|(name, value)| (name, value.as_str())),
                    )?;
                    self.write_nodes(children, serializer)?;
                    serializer.end_elem(name.clone())?;
                }
                Node::Image(index) => {
                    if let Some(image) = self.images.get(*index) {
                        image.serialize(serializer)?;
                    }
                }
                Node::Text(text) => serializer.write_text(text)?,
                Node::Comment(text) => serializer.write_comment(text)?,
                Node::Doctype(name) => serializer.write_doctype(name)?,
                Node::ProcessingInstruction { target, data } => {
                    serializer.write_processing_instruction(target, data)?
                }
            }
        }
        Ok(())
    }
}

impl Serialize for MarkupDocument {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        _traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        self.write_nodes(&self.nodes, serializer)
    }
}

impl RenderedSubtreePort for MarkupDocument {
    fn id(&self) -> &SubtreeId {
        &self.id
    }

    fn images(&self) -> Result<Vec<Arc<dyn ImageElementPort>>> {
        if !self.is_attached() {
            bail!("subtree {} is not attached", self.id);
        }
        Ok(self
            .images
            .iter()
            .map(|image| Arc::clone(image) as Arc<dyn ImageElementPort>)
            .collect())
    }

    fn outer_html(&self) -> Result<String> {
        if !self.is_attached() {
            bail!("subtree {} is not attached", self.id);
        }
        self.to_html()
    }
}

/// Copies an `RcDom` into [`Node`]s, collecting image elements on the way.
struct TreeBuilder {
    images: Vec<Arc<MarkupImage>>,
    attached: Arc<AtomicBool>,
}

impl TreeBuilder {
    fn children(&mut self, handle: &Handle) -> Vec<Node> {
        handle
            .children
            .borrow()
            .iter()
            .filter_map(|child| self.node(child))
            .collect()
    }

    fn node(&mut self, handle: &Handle) -> Option<Node> {
        match &handle.data {
            NodeData::Document => None,
            NodeData::Doctype { name, .. } => Some(Node::Doctype(name.to_string())),
            NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
            NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
            NodeData::ProcessingInstruction { target, contents } => {
                Some(Node::ProcessingInstruction {
                    target: target.to_string(),
                    data: contents.to_string(),
                })
            }
            NodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let attrs: Attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attr.name.clone(), attr.value.to_string()))
                    .collect();

                if is_html_element(name, "img") {
                    self.images.push(Arc::new(MarkupImage::new(
                        name.clone(),
                        attrs,
                        Arc::clone(&self.attached),
                    )));
                    return Some(Node::Image(self.images.len() - 1));
                }

                let mut children = self.children(handle);
                if let Some(contents) = template_contents.borrow().as_ref() {
                    children.extend(self.children(contents));
                }
                Some(Node::Element {
                    name: name.clone(),
                    attrs,
                    children,
                })
            }
        }
    }
}

fn is_full_document(html: &str) -> bool {
    let head = html.trim_start().as_bytes();
    [b"<!doctype".as_slice(), b"<html".as_slice()]
        .iter()
        .any(|prefix| head.len() >= prefix.len() && head[..prefix.len()].eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::MaterializedAsset;

    const HTML: &str = concat!(
        r#"<div class="form"><h1>Undertaking</h1>"#,
        r#"<img alt="photo" src="https://cdn.x/static/p.png" width="120">"#,
        r#"<IMG SRC='https://cdn.x/static/s.png'/>"#,
        r#"<img data-src="lazy.png">"#,
        r#"<img src=bare.png></div>"#,
    );

    fn document() -> MarkupDocument {
        MarkupDocument::parse_loaded(SubtreeId::from("undertaking"), HTML)
    }

    fn srcs(doc: &MarkupDocument) -> Vec<Option<String>> {
        doc.images()
            .unwrap()
            .iter()
            .map(|image| image.src().map(|r| r.as_str().to_string()))
            .collect()
    }

    fn asset() -> MaterializedAsset {
        MaterializedAsset::from_encoded("image/png", b"x")
    }

    #[test]
    fn test_finds_images_in_order() {
        assert_eq!(
            srcs(&document()),
            vec![
                Some("https://cdn.x/static/p.png".to_string()),
                Some("https://cdn.x/static/s.png".to_string()),
                None,
                Some("bare.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_unchanged_document_serializes_normalized() {
        assert_eq!(
            document().to_html().unwrap(),
            concat!(
                r#"<div class="form"><h1>Undertaking</h1>"#,
                r#"<img alt="photo" src="https://cdn.x/static/p.png" width="120">"#,
                r#"<img src="https://cdn.x/static/s.png">"#,
                r#"<img data-src="lazy.png">"#,
                r#"<img src="bare.png"></div>"#,
            )
        );
    }

    #[test]
    fn test_swapped_sources_are_rendered() {
        let doc = document();
        let asset = asset();
        for image in doc.images().unwrap() {
            image.set_src(&asset).unwrap();
        }

        let html = doc.outer_html().unwrap();

        assert!(!html.contains("https://cdn.x"));
        assert!(!html.contains("bare.png"));
        assert!(html.contains(&format!(
            r#"<img alt="photo" src="{}" width="120">"#,
            asset.as_str()
        )));
        assert!(html.contains(&format!(
            r#"<img data-src="lazy.png" src="{}">"#,
            asset.as_str()
        )));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_quoted_angle_bracket_does_not_end_the_tag() {
        let doc = MarkupDocument::parse_loaded(
            SubtreeId::from("score"),
            r#"<img alt="score > 90" src="https://cdn.x/a.png">"#,
        );
        assert_eq!(srcs(&doc), vec![Some("https://cdn.x/a.png".to_string())]);

        doc.image(0).unwrap().set_src(&asset()).unwrap();

        assert_eq!(
            doc.to_html().unwrap(),
            format!(r#"<img alt="score > 90" src="{}">"#, asset().as_str())
        );
    }

    #[test]
    fn test_src_text_inside_other_attribute_is_ignored() {
        let doc = MarkupDocument::parse_loaded(
            SubtreeId::from("alt"),
            r#"<img alt="see src=old.png" src="https://cdn.x/a.png">"#,
        );
        assert_eq!(srcs(&doc), vec![Some("https://cdn.x/a.png".to_string())]);

        doc.image(0).unwrap().set_src(&asset()).unwrap();

        assert_eq!(
            doc.to_html().unwrap(),
            format!(r#"<img alt="see src=old.png" src="{}">"#, asset().as_str())
        );
    }

    #[test]
    fn test_images_inside_comments_are_not_elements() {
        let html = r#"<!-- <img src="https://cdn.x/hidden.png"> --><p><img src="https://cdn.x/a.png"></p>"#;
        let doc = MarkupDocument::parse_loaded(SubtreeId::from("comment"), html);

        assert_eq!(doc.image_count(), 1);
        assert_eq!(srcs(&doc), vec![Some("https://cdn.x/a.png".to_string())]);
        assert_eq!(doc.to_html().unwrap(), html);
    }

    #[test]
    fn test_character_references_in_src_are_decoded() {
        let doc = MarkupDocument::parse_loaded(
            SubtreeId::from("entities"),
            r#"<img src="https:&#x2F;&#x2F;cdn.x&#47;a.png?w=1&amp;h=2">"#,
        );

        assert_eq!(
            srcs(&doc),
            vec![Some("https://cdn.x/a.png?w=1&h=2".to_string())]
        );
        assert_eq!(
            doc.to_html().unwrap(),
            r#"<img src="https://cdn.x/a.png?w=1&amp;h=2">"#
        );
    }

    #[test]
    fn test_text_is_escaped_on_output() {
        let html = "<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>";
        let doc = MarkupDocument::parse_loaded(SubtreeId::from("text"), html);
        assert_eq!(doc.to_html().unwrap(), html);
    }

    #[test]
    fn test_full_document_keeps_doctype_and_head() {
        let doc = MarkupDocument::parse_loaded(
            SubtreeId::from("page"),
            "<!DOCTYPE html><html><head><title>Offer</title></head>\
             <body><img src=\"https://cdn.x/a.png\"></body></html>",
        );

        assert_eq!(doc.image_count(), 1);
        let html = doc.to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<head><title>Offer</title></head>"));
        assert!(html.contains(r#"<body><img src="https://cdn.x/a.png"></body>"#));
    }

    #[test]
    fn test_detached_document_is_unavailable() {
        let doc = document();
        doc.detach();
        assert!(doc.images().is_err());
        assert!(doc.outer_html().is_err());
    }

    #[tokio::test]
    async fn test_parse_loaded_images_are_settled() {
        let doc = document();
        for image in doc.images().unwrap() {
            image.wait_settled().await;
        }
    }
}
