//! Extraction engine that walks the tree and dispatches to handlers.

use roxmltree::Node;

use super::registry::{BlockRegistry, Emit, NormalizeContext};
use super::{collapse_ws, deep_text, Block};

/// Engine that orchestrates block extraction using the registry.
///
/// The engine walks the XML tree and dispatches elements to their registered
/// handlers. An element with no handler collapses to a `Preserved` block
/// carrying its flattened text, with a warning; content is never silently
/// dropped.
pub struct ExtractEngine {
    registry: BlockRegistry,
}

impl ExtractEngine {
    /// Create a new engine with the given registry.
    #[must_use]
    pub fn new(registry: BlockRegistry) -> Self {
        Self { registry }
    }

    /// Get a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Extract blocks from an element tree recursively.
    pub fn extract(&self, node: Node<'_, '_>, context: &mut NormalizeContext) -> Emit {
        let tag_name = node.tag_name().name();

        if self.registry.should_skip(tag_name) {
            return Emit::Nothing;
        }

        if let Some(handler) = self.registry.get_handler(node, context) {
            let recurse = |child: Node<'_, '_>, ctx: &mut NormalizeContext| -> Emit {
                self.extract(child, ctx)
            };
            return handler.handle(node, context, &recurse);
        }

        // No handler: keep the text, flag the element
        let text = collapse_ws(&deep_text(node));
        if text.is_empty() {
            return Emit::Nothing;
        }
        tracing::debug!(tag = tag_name, "unrecognized element preserved as text");
        context.warn(format!(
            "unrecognized element <{tag_name}> preserved as plain text"
        ));
        Emit::Blocks(vec![Block::Preserved(text)])
    }

    /// Extract blocks from all element children of a node, in document order.
    pub fn extract_children(&self, node: Node<'_, '_>, context: &mut NormalizeContext) -> Vec<Block> {
        let mut blocks = Vec::new();
        for child in node.children().filter(Node::is_element) {
            blocks.extend(self.extract(child, context).into_blocks());
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::registry::{BlockHandler, RecurseFn};
    use roxmltree::Document;

    struct TextHandler;

    impl BlockHandler for TextHandler {
        fn handle<'a, 'input>(
            &self,
            node: Node<'a, 'input>,
            _context: &mut NormalizeContext,
            _recurse: &RecurseFn<'a, 'input>,
        ) -> Emit {
            Emit::Text(collapse_ws(&deep_text(node)))
        }
    }

    #[test]
    fn test_engine_extract_with_handler() {
        let mut registry = BlockRegistry::new();
        registry.register("p", TextHandler);
        let engine = ExtractEngine::new(registry);

        let doc = Document::parse("<p>hello</p>").unwrap();
        let mut context = NormalizeContext::new();

        let emit = engine.extract(doc.root_element(), &mut context);
        assert!(matches!(emit, Emit::Text(t) if t == "hello"));
        assert!(context.warnings.is_empty());
    }

    #[test]
    fn test_engine_extract_skip() {
        let mut registry = BlockRegistry::new();
        registry.skip(["script"]);
        let engine = ExtractEngine::new(registry);

        let doc = Document::parse("<script>var x;</script>").unwrap();
        let mut context = NormalizeContext::new();

        let emit = engine.extract(doc.root_element(), &mut context);
        assert!(matches!(emit, Emit::Nothing));
    }

    #[test]
    fn test_engine_preserves_unknown_with_warning() {
        let engine = ExtractEngine::new(BlockRegistry::new());

        let doc = Document::parse("<table><tr><td>cell</td></tr></table>").unwrap();
        let mut context = NormalizeContext::new();

        let emit = engine.extract(doc.root_element(), &mut context);
        let blocks = emit.into_blocks();
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], Block::Preserved(t) if t == "cell"));
        assert_eq!(context.warnings.len(), 1);
        assert!(context.warnings[0].contains("<table>"));
    }

    #[test]
    fn test_engine_empty_unknown_is_silent() {
        let engine = ExtractEngine::new(BlockRegistry::new());

        let doc = Document::parse("<hr/>").unwrap();
        let mut context = NormalizeContext::new();

        let emit = engine.extract(doc.root_element(), &mut context);
        assert!(matches!(emit, Emit::Nothing));
        assert!(context.warnings.is_empty());
    }
}
