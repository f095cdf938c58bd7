use marmot_common::warning::warn_once;
use marmot_dom::{AttributesMap, DoctypeData, DomTree, ElementData, NodeId, NodeType};

use super::error::{Construct, UnexpectedToken};
use crate::issue::ParseIssue;
use crate::tokenizer::{Token, TokenType};

/// An element whose start tag has been read but whose `ELEM_END` has not.
struct OpenElement {
    prefix: Option<String>,
    name: String,
    attrs: AttributesMap,
    children: Vec<NodeId>,
}

/// Grammar-driven tree builder.
///
/// Reduces this grammar, pulling one token at a time with a single token of
/// lookahead:
///
/// ```text
/// document     → expressions END_OF_INPUT
/// expressions  → expression*
/// expression   → doctype | cdata | comment | xmldecl | element | text
/// doctype      → DOCTYPE_START DOCTYPE_NAME (DOCTYPE_TYPE (STRING STRING?)?)? DOCTYPE_END
/// cdata        → CDATA_START TEXT* CDATA_END
/// comment      → COMMENT_START COMMENT_BODY* COMMENT_END
/// xmldecl      → XML_DECL_START attributes XML_DECL_END
/// element      → element_open attributes expressions ELEM_END
/// element_open → ELEM_START ELEM_NS? ELEM_NAME
/// attributes   → (ATTR STRING?)*
/// text         → TEXT
/// ```
///
/// Nested elements live on an explicit stack of open elements rather than
/// the call stack, so nesting depth is bounded only by memory. Every
/// reduction allocates exactly one node from already-reduced parts; an
/// element is allocated and its children linked through
/// [`DomTree::link_children`] when its `ELEM_END` pops it off the stack.
/// The name on a closing tag is not compared with the opening name.
pub struct TreeBuilder<I> {
    tokens: I,
    lookahead: Option<Token>,
    /// Line of the last token pulled, used if the stream ends without an
    /// `END_OF_INPUT` marker.
    last_line: usize,
    tree: DomTree,
    open_elements: Vec<OpenElement>,
    issues: Vec<ParseIssue>,
}

impl<I: Iterator<Item = Token>> TreeBuilder<I> {
    /// Create a builder over a token stream.
    #[must_use]
    pub fn new(tokens: I) -> Self {
        // DomTree::new() creates the Document node at NodeId::ROOT
        Self {
            tokens,
            lookahead: None,
            last_line: 1,
            tree: DomTree::new(),
            open_elements: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Reduce the whole stream into a document.
    ///
    /// # Errors
    ///
    /// Returns the first token the grammar does not accept, with the
    /// construct that was open at that point.
    pub fn build(self) -> Result<DomTree, UnexpectedToken> {
        self.build_with_issues().0
    }

    /// Reduce the whole stream and also return the issues noticed on the
    /// way. The issues are returned even when the reduction fails.
    pub fn build_with_issues(mut self) -> (Result<DomTree, UnexpectedToken>, Vec<ParseIssue>) {
        match self.reduce() {
            Ok(()) => (Ok(self.tree), self.issues),
            Err(unexpected) => (Err(unexpected), self.issues),
        }
    }

    // =========================================================================
    // Token access
    // =========================================================================

    fn pull(&mut self) -> Token {
        let token = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::end_of_input(self.last_line));
        self.last_line = token.line;
        token
    }

    /// The next token, pulling it if needed.
    fn peek(&mut self) -> &Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.pull(),
        };
        self.lookahead.insert(token)
    }

    fn peek_type(&mut self) -> TokenType {
        self.peek().token_type
    }

    /// Take the next token.
    fn bump(&mut self) -> Token {
        match self.lookahead.take() {
            Some(token) => token,
            None => self.pull(),
        }
    }

    /// Take the next token if it is of `token_type`, fail otherwise.
    fn expect(&mut self, token_type: TokenType, construct: Construct) -> Result<Token, UnexpectedToken> {
        let token = self.bump();
        if token.token_type == token_type {
            Ok(token)
        } else {
            Err(UnexpectedToken { token, construct })
        }
    }

    /// Take the next token if it is of `token_type`.
    fn accept(&mut self, token_type: TokenType) -> Option<Token> {
        if self.peek_type() == token_type {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Record a recoverable issue and log it once per kind.
    fn issue(&mut self, kind: &str, message: String, line: usize) {
        warn_once("Parser", kind);
        self.issues.push(ParseIssue::new(message, line));
    }

    // =========================================================================
    // Productions
    // =========================================================================

    /// `document → expressions END_OF_INPUT`
    ///
    /// `expressions` at every depth is this one loop. Start and end tags push
    /// and pop open elements; any other expression joins the innermost open
    /// element, or the top level when none is open.
    fn reduce(&mut self) -> Result<(), UnexpectedToken> {
        // Top-level nodes with the line they started on
        let mut top_level: Vec<(NodeId, usize)> = Vec::new();
        loop {
            let (token_type, line) = {
                let token = self.peek();
                (token.token_type, token.line)
            };
            let node = match token_type {
                TokenType::ElemStart => {
                    self.element_open()?;
                    continue;
                }
                TokenType::ElemEnd => match self.open_elements.pop() {
                    Some(open) => {
                        let _ = self.bump();
                        self.element_close(open)
                    }
                    None => break,
                },
                TokenType::Text => self.text(),
                TokenType::CommentStart => self.comment()?,
                TokenType::CdataStart => self.cdata()?,
                TokenType::DoctypeStart => self.doctype()?,
                TokenType::XmlDeclStart => self.xml_declaration()?,
                _ => break,
            };
            match self.open_elements.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top_level.push((node, line)),
            }
        }

        let token = self.bump();
        if !self.open_elements.is_empty() {
            return Err(UnexpectedToken {
                token,
                construct: Construct::Element,
            });
        }
        if !token.is_end_of_input() {
            return Err(UnexpectedToken {
                token,
                construct: Construct::Document,
            });
        }
        self.create_document(top_level);
        Ok(())
    }

    fn text(&mut self) -> NodeId {
        let text = self.bump().value.unwrap_or_default();
        self.tree.alloc(NodeType::Text(text))
    }

    /// `element_open attributes`: the start tag up to its children.
    fn element_open(&mut self) -> Result<(), UnexpectedToken> {
        let _ = self.expect(TokenType::ElemStart, Construct::Element)?;
        let prefix = self.accept(TokenType::ElemNs).and_then(|token| token.value);
        let name = self
            .expect(TokenType::ElemName, Construct::Element)?
            .value
            .unwrap_or_default();
        let attrs = self.attributes();
        self.open_elements.push(OpenElement {
            prefix,
            name,
            attrs,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Reduce an open element whose `ELEM_END` has just been taken.
    fn element_close(&mut self, open: OpenElement) -> NodeId {
        let id = self.tree.alloc(NodeType::Element(ElementData {
            prefix: open.prefix,
            name: open.name,
            attrs: open.attrs,
        }));
        self.tree.link_children(id, open.children);
        id
    }

    /// `attributes → (ATTR STRING?)*`, folded into one map. A repeated name
    /// overwrites the earlier value.
    fn attributes(&mut self) -> AttributesMap {
        let mut attrs = AttributesMap::new();
        while self.peek_type() == TokenType::Attr {
            let attr = self.bump();
            let name = attr.value.unwrap_or_default();
            let value = self.accept(TokenType::String).and_then(|token| token.value);
            if attrs.insert(name.clone(), value).is_some() {
                self.issue(
                    "duplicate attribute; the last value wins",
                    format!("duplicate attribute '{name}'; the last value wins"),
                    attr.line,
                );
            }
        }
        attrs
    }

    /// `comment → COMMENT_START COMMENT_BODY* COMMENT_END`
    fn comment(&mut self) -> Result<NodeId, UnexpectedToken> {
        let _ = self.expect(TokenType::CommentStart, Construct::Comment)?;
        let body = self.body(TokenType::CommentBody);
        let _ = self.expect(TokenType::CommentEnd, Construct::Comment)?;
        Ok(self.tree.alloc(NodeType::Comment(body)))
    }

    /// `cdata → CDATA_START TEXT* CDATA_END`
    fn cdata(&mut self) -> Result<NodeId, UnexpectedToken> {
        let _ = self.expect(TokenType::CdataStart, Construct::Cdata)?;
        let body = self.body(TokenType::Text);
        let _ = self.expect(TokenType::CdataEnd, Construct::Cdata)?;
        Ok(self.tree.alloc(NodeType::Cdata(body)))
    }

    /// Join consecutive body fragments; `None` when there are none.
    fn body(&mut self, fragment: TokenType) -> Option<String> {
        let mut body: Option<String> = None;
        while let Some(token) = self.accept(fragment) {
            body.get_or_insert_with(String::new)
                .push_str(token.value().unwrap_or_default());
        }
        body
    }

    /// The four doctype arities: name; name + type; name + type + public
    /// identifier; name + type + public identifier + system identifier.
    fn doctype(&mut self) -> Result<NodeId, UnexpectedToken> {
        let _ = self.expect(TokenType::DoctypeStart, Construct::Doctype)?;
        let name = self
            .expect(TokenType::DoctypeName, Construct::Doctype)?
            .value
            .unwrap_or_default();
        let mut data = DoctypeData {
            name,
            doc_type: None,
            public_id: None,
            system_id: None,
        };

        if let Some(doc_type) = self.accept(TokenType::DoctypeType) {
            data.doc_type = doc_type.value;
            if let Some(public_id) = self.accept(TokenType::String) {
                data.public_id = public_id.value;
                data.system_id = self.accept(TokenType::String).and_then(|token| token.value);
            }
        }
        let _ = self.expect(TokenType::DoctypeEnd, Construct::Doctype)?;

        Ok(self.tree.alloc(NodeType::Doctype(data)))
    }

    /// `xmldecl → XML_DECL_START attributes XML_DECL_END`
    fn xml_declaration(&mut self) -> Result<NodeId, UnexpectedToken> {
        let _ = self.expect(TokenType::XmlDeclStart, Construct::XmlDeclaration)?;
        let attrs = self.attributes();
        let _ = self.expect(TokenType::XmlDeclEnd, Construct::XmlDeclaration)?;
        Ok(self.tree.alloc(NodeType::XmlDeclaration(attrs)))
    }

    /// Promote top-level doctype and XML declaration nodes into the document
    /// slots and link everything else as the document's children.
    ///
    /// When a slot is filled twice the later node wins.
    fn create_document(&mut self, top_level: Vec<(NodeId, usize)>) {
        const EXTRA_DOCTYPE: &str = "document has more than one doctype; the last one wins";
        const EXTRA_DECLARATION: &str =
            "document has more than one XML declaration; the last one wins";

        let mut rest = Vec::with_capacity(top_level.len());
        for (id, line) in top_level {
            let node_type = self.tree.get(id).map(|node| &node.node_type);
            let is_doctype = matches!(node_type, Some(NodeType::Doctype(_)));
            let is_declaration = matches!(node_type, Some(NodeType::XmlDeclaration(_)));

            if is_doctype {
                if self.tree.set_doctype(id).is_some() {
                    self.issue(EXTRA_DOCTYPE, EXTRA_DOCTYPE.to_string(), line);
                }
            } else if is_declaration {
                if self.tree.set_xml_declaration(id).is_some() {
                    self.issue(EXTRA_DECLARATION, EXTRA_DECLARATION.to_string(), line);
                }
            } else {
                rest.push(id);
            }
        }
        self.tree.link_children(NodeId::ROOT, rest);
    }
}

/// Print a DOM tree for debugging.
///
/// Document slots print before the document's children. The walk keeps its
/// own stack, so arbitrarily deep trees print without recursion.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let mut stack = vec![(id, indent)];
    while let Some((id, indent)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        println!("{}{}", "  ".repeat(indent), describe_node(&node.node_type));

        // Pushed in reverse so they pop in document order
        for &child_id in tree.children(id).iter().rev() {
            stack.push((child_id, indent + 1));
        }
        if let NodeType::Document(data) = &node.node_type {
            for slot in [data.xml_declaration, data.doctype].into_iter().flatten() {
                stack.push((slot, indent + 1));
            }
        }
    }
}

/// One line of [`print_tree`] output, without indentation.
fn describe_node(node_type: &NodeType) -> String {
    match node_type {
        NodeType::Document(_) => "Document".to_string(),
        NodeType::Element(data) => {
            let name = data.qualified_name();
            if data.attrs.is_empty() {
                format!("<{name}>")
            } else {
                format!("<{name} {}>", format_attributes(&data.attrs))
            }
        }
        NodeType::Doctype(data) => {
            let mut parts = vec![data.name.clone()];
            parts.extend(data.doc_type.clone());
            parts.extend(data.public_id.iter().map(|id| format!("\"{id}\"")));
            parts.extend(data.system_id.iter().map(|id| format!("\"{id}\"")));
            format!("<!DOCTYPE {}>", parts.join(" "))
        }
        NodeType::Comment(data) => format!("<!--{}-->", data.as_deref().unwrap_or_default()),
        NodeType::Cdata(data) => format!("<![CDATA[{}]]>", data.as_deref().unwrap_or_default()),
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            format!("\"{display}\"")
        }
        NodeType::XmlDeclaration(attrs) => {
            if attrs.is_empty() {
                "<?xml?>".to_string()
            } else {
                format!("<?xml {}?>", format_attributes(attrs))
            }
        }
    }
}

/// Attributes in name order, bare attributes without `=`.
fn format_attributes(attrs: &AttributesMap) -> String {
    let mut pairs: Vec<_> = attrs.iter().collect();
    pairs.sort_by_key(|&(name, _)| name);
    pairs
        .into_iter()
        .map(|(name, value)| match value {
            Some(value) => format!("{name}=\"{value}\""),
            None => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
