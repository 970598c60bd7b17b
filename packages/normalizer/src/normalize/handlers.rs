//! Element handlers for the Lovdata HTML-shaped markup.
//!
//! The archive files carry legal structure as class attributes on generic
//! HTML elements: `section.legalChapter` for chapters,
//! `article.legalArticle` for § articles, `article.legalP` for body
//! paragraphs. Handlers turn those into heading and paragraph blocks.

use roxmltree::Node;

use super::registry::{BlockHandler, BlockRegistry, Emit, NormalizeContext, RecurseFn};
use super::{collapse_ws, deep_text, split_heading, Block};

/// Class names that mark a chapter-like container on `<section>`.
const CHAPTER_CLASSES: [&str; 3] = ["legalChapter", "legalPart", "legalSubchapter"];

fn has_class(node: Node<'_, '_>, name: &str) -> bool {
    node.attribute("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == name))
}

/// Heading level carried by an `h2`..`h6` tag, if the node is one.
fn heading_tag_level(node: Node<'_, '_>) -> Option<u8> {
    match node.tag_name().name() {
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn collect_children<'a, 'input>(
    node: Node<'a, 'input>,
    context: &mut NormalizeContext,
    recurse: &RecurseFn<'a, 'input>,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    for child in node.children().filter(Node::is_element) {
        blocks.extend(recurse(child, context).into_blocks());
    }
    blocks
}

/// Handler for generic container elements (`html`, `body`, `main`, `div`).
///
/// Recurses into children and passes their blocks through unchanged.
pub struct ContainerHandler;

impl BlockHandler for ContainerHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut NormalizeContext,
        recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        Emit::Blocks(collect_children(node, context, recurse))
    }
}

/// Handler for `<section>` elements.
///
/// A section with a chapter class opens a new structural level: its first
/// heading child becomes a `Heading` at `depth + 1` and its remaining
/// children are extracted one level deeper. Sections without a chapter
/// class are plain containers.
pub struct SectionHandler;

impl BlockHandler for SectionHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut NormalizeContext,
        recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        let is_chapter = CHAPTER_CLASSES.iter().any(|c| has_class(node, c));
        if !is_chapter {
            return Emit::Blocks(collect_children(node, context, recurse));
        }

        let prev_depth = context.depth;
        let level = prev_depth.saturating_add(1);
        context.depth = level;

        let mut blocks = Vec::new();
        let mut heading_consumed = false;
        for child in node.children().filter(Node::is_element) {
            if !heading_consumed && heading_tag_level(child).is_some() {
                heading_consumed = true;
                let text = collapse_ws(&deep_text(child));
                if !text.is_empty() {
                    let (label, title) = split_heading(&text);
                    blocks.push(Block::Heading {
                        level,
                        label,
                        title,
                    });
                }
                continue;
            }
            blocks.extend(recurse(child, context).into_blocks());
        }

        context.depth = prev_depth;
        Emit::Blocks(blocks)
    }
}

/// Handler for `<article>` elements.
///
/// `legalArticle` articles open a § heading one level below the enclosing
/// chapter; the label and title come from the `legalArticleValue` and
/// `legalArticleTitle` spans inside the article's heading when present.
/// `legalP` articles are body paragraphs. Anything else is a container.
pub struct ArticleHandler;

impl ArticleHandler {
    fn span_text(heading: Node<'_, '_>, class: &str) -> Option<String> {
        heading
            .descendants()
            .find(|n| n.is_element() && has_class(*n, class))
            .map(|n| collapse_ws(&deep_text(n)))
            .filter(|t| !t.is_empty())
    }
}

impl BlockHandler for ArticleHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut NormalizeContext,
        recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        if has_class(node, "legalP") {
            let text = collapse_ws(&deep_text(node));
            if text.is_empty() {
                return Emit::Nothing;
            }
            return Emit::Blocks(vec![Block::Paragraph(text)]);
        }

        if !has_class(node, "legalArticle") {
            return Emit::Blocks(collect_children(node, context, recurse));
        }

        // An article outside any chapter still nests one level down, so the
        // hierarchy repair can reattach it.
        let level = context.depth.max(1).saturating_add(1);

        let mut blocks = Vec::new();
        let mut heading_consumed = false;
        for child in node.children().filter(Node::is_element) {
            if !heading_consumed && heading_tag_level(child).is_some() {
                heading_consumed = true;
                let label = Self::span_text(child, "legalArticleValue");
                let title = Self::span_text(child, "legalArticleTitle");
                if let Some(label) = label {
                    blocks.push(Block::Heading {
                        level,
                        label,
                        title,
                    });
                } else {
                    let text = collapse_ws(&deep_text(child));
                    if !text.is_empty() {
                        let (label, title) = split_heading(&text);
                        blocks.push(Block::Heading {
                            level,
                            label,
                            title,
                        });
                    }
                }
                continue;
            }
            blocks.extend(recurse(child, context).into_blocks());
        }

        Emit::Blocks(blocks)
    }
}

/// Handler for bare `h2`..`h6` headings outside chapter/article containers.
///
/// The heading level is the tag number minus one (`h2` opens level 1).
pub struct HeadingHandler;

impl BlockHandler for HeadingHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        _context: &mut NormalizeContext,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        let Some(tag_level) = heading_tag_level(node) else {
            return Emit::Nothing;
        };
        let text = collapse_ws(&deep_text(node));
        if text.is_empty() {
            return Emit::Nothing;
        }
        let (label, title) = split_heading(&text);
        Emit::Blocks(vec![Block::Heading {
            level: tag_level - 1,
            label,
            title,
        }])
    }
}

/// Handler for `<p>` elements.
pub struct ParagraphHandler;

impl BlockHandler for ParagraphHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        _context: &mut NormalizeContext,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        let text = collapse_ws(&deep_text(node));
        if text.is_empty() {
            Emit::Nothing
        } else {
            Emit::Blocks(vec![Block::Paragraph(text)])
        }
    }
}

/// Handler for inline elements (`em`, `strong`, `span`, `a`, `sup`, `sub`).
///
/// Contributes flattened text to the enclosing block.
pub struct InlineHandler;

impl BlockHandler for InlineHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        _context: &mut NormalizeContext,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        Emit::Text(collapse_ws(&deep_text(node)))
    }
}

/// Handler for `<ul>` and `<ol>` lists.
///
/// Each list item becomes its own dashed paragraph.
pub struct ListHandler;

impl BlockHandler for ListHandler {
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        _context: &mut NormalizeContext,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> Emit {
        let mut blocks = Vec::new();
        for item in node
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == "li")
        {
            let text = collapse_ws(&deep_text(item));
            if !text.is_empty() {
                blocks.push(Block::Paragraph(format!("- {text}")));
            }
        }
        Emit::Blocks(blocks)
    }
}

/// Create a block registry configured for Lovdata archive markup.
#[must_use]
pub fn create_block_registry() -> BlockRegistry {
    let mut registry = BlockRegistry::new();

    // Containers
    registry.register("html", ContainerHandler);
    registry.register("body", ContainerHandler);
    registry.register("main", ContainerHandler);
    registry.register("div", ContainerHandler);
    registry.register("section", SectionHandler);
    registry.register("article", ArticleHandler);

    // Headings (h1 is the document title, collected with the header fields)
    registry.register("h2", HeadingHandler);
    registry.register("h3", HeadingHandler);
    registry.register("h4", HeadingHandler);
    registry.register("h5", HeadingHandler);
    registry.register("h6", HeadingHandler);

    // Text
    registry.register("p", ParagraphHandler);
    registry.register("ul", ListHandler);
    registry.register("ol", ListHandler);

    // Inline
    registry.register("em", InlineHandler);
    registry.register("strong", InlineHandler);
    registry.register("i", InlineHandler);
    registry.register("b", InlineHandler);
    registry.register("span", InlineHandler);
    registry.register("a", InlineHandler);
    registry.register("sup", InlineHandler);
    registry.register("sub", InlineHandler);

    // Editorial markup with no body content. The header <dl> is read
    // separately for metadata; h1 likewise.
    registry.skip([
        "head", "meta", "link", "title", "style", "script", "nav", "footer", "header", "dl",
        "dt", "dd", "h1", "img", "figure", "br", "hr",
    ]);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::engine::ExtractEngine;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    fn extract(xml: &str) -> (Vec<Block>, Vec<String>) {
        let doc = Document::parse(xml).unwrap();
        let engine = ExtractEngine::new(create_block_registry());
        let mut context = NormalizeContext::new();
        let blocks = engine.extract(doc.root_element(), &mut context).into_blocks();
        (blocks, context.warnings)
    }

    #[test]
    fn test_chapter_section_emits_heading_and_descends() {
        let xml = r#"<section class="legalChapter">
            <h2>Kapittel 1. Alminnelige bestemmelser</h2>
            <article class="legalP">Innholdet.</article>
        </section>"#;
        let (blocks, warnings) = extract(xml);

        assert_eq!(blocks.len(), 2);
        assert!(matches!(
            &blocks[0],
            Block::Heading { level: 1, label, title: Some(title) }
                if label == "Kapittel 1" && title == "Alminnelige bestemmelser"
        ));
        assert!(matches!(&blocks[1], Block::Paragraph(t) if t == "Innholdet."));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_article_heading_from_spans() {
        let xml = r#"<section class="legalChapter">
            <h2>Kapittel 1. Alminnelige bestemmelser</h2>
            <article class="legalArticle">
                <h3><span class="legalArticleValue">§ 1</span> <span class="legalArticleTitle">Formål</span></h3>
                <article class="legalP">Loven skal sikre.</article>
            </article>
        </section>"#;
        let (blocks, _) = extract(xml);

        assert_eq!(blocks.len(), 3);
        assert!(matches!(
            &blocks[1],
            Block::Heading { level: 2, label, title: Some(title) }
                if label == "§ 1" && title == "Formål"
        ));
        assert!(matches!(&blocks[2], Block::Paragraph(t) if t == "Loven skal sikre."));
    }

    #[test]
    fn test_orphan_article_nests_below_root() {
        // Article with no enclosing chapter still opens level 2
        let xml = r#"<article class="legalArticle">
            <h3><span class="legalArticleValue">§ 7</span></h3>
            <article class="legalP">Tekst.</article>
        </article>"#;
        let (blocks, _) = extract(xml);

        assert!(matches!(
            &blocks[0],
            Block::Heading { level: 2, label, title: None } if label == "§ 7"
        ));
    }

    #[test]
    fn test_bare_heading_level_from_tag() {
        let (blocks, _) = extract("<h3>Kapittel 2. Straff</h3>");
        assert!(matches!(
            &blocks[0],
            Block::Heading { level: 2, label, title: Some(title) }
                if label == "Kapittel 2" && title == "Straff"
        ));
    }

    #[test]
    fn test_paragraph_collapses_whitespace() {
        let (blocks, _) = extract("<p>  To \n  linjer  </p>");
        assert!(matches!(&blocks[0], Block::Paragraph(t) if t == "To linjer"));
    }

    #[test]
    fn test_paragraph_includes_inline_text() {
        let (blocks, _) = extract("<p>Et <em>viktig</em> ord.</p>");
        assert!(matches!(&blocks[0], Block::Paragraph(t) if t == "Et viktig ord."));
    }

    #[test]
    fn test_list_items_become_paragraphs() {
        let (blocks, _) = extract("<ul><li>Departementet</li><li>Direktoratet</li></ul>");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::Paragraph(t) if t == "- Departementet"));
        assert!(matches!(&blocks[1], Block::Paragraph(t) if t == "- Direktoratet"));
    }

    #[test]
    fn test_plain_section_is_container() {
        let xml = r#"<section><p>Tekst.</p></section>"#;
        let (blocks, warnings) = extract(xml);
        assert_eq!(blocks.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_registry_coverage() {
        let registry = create_block_registry();
        assert!(registry.has_handler("section"));
        assert!(registry.has_handler("article"));
        assert!(registry.has_handler("p"));
        assert!(registry.should_skip("head"));
        assert!(registry.should_skip("dl"));
        assert!(registry.should_skip("h1"));
    }
}
