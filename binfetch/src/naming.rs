//! Translating goreleaser-style name templates into shell
//!
//! Archive and checksum names are written as Go templates
//! (`{{ .Binary }}_{{ .Version }}_{{ .Os }}_{{ .Arch }}`), but the installer has to
//! compute them at runtime, in POSIX sh. We only support the subset of the
//! template language that maps cleanly onto shell variables:
//!
//! * field references to the six fields in [`Placeholder`][]
//! * literal text that is safe in an unquoted shell word
//! * the two ARM suffix idioms goreleaser users write after `.Arch`:
//!     * `{{ .Arch }}{{ if .Arm }}v{{ .Arm }}{{ end }}`
//!     * `{{ .Arch }}{{ if .Arm }}{{ .Arm }}{{ end }}`
//!
//! The ARM idioms fold down to a bare `${ARCH}`, because the installer's
//! `uname_arch` already reports arm machines as `armv6`/`armv7`/...
//!
//! Anything else is refused. We'd much rather fail loudly at generation time
//! than ship an installer that computes the wrong URL.

use std::fmt;

use miette::SourceSpan;

use crate::errors::{DistError, DistResult};

/// Assignment prefix for the archive name
pub const ARCHIVE_NAME_PREFIX: &str = "NAME=";
/// Assignment prefix for the checksum file name
pub const CHECKSUM_NAME_PREFIX: &str = "CHECKSUM=";

/// A template field we know the shell equivalent of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `.Os`
    Os,
    /// `.Arch`
    Arch,
    /// `.Version`
    Version,
    /// `.Tag`
    Tag,
    /// `.Binary`
    Binary,
    /// `.ProjectName`
    ProjectName,
}

impl Placeholder {
    /// Look up a field by the name used in templates
    pub fn from_field(field: &str) -> Option<Self> {
        let placeholder = match field {
            "Os" | "OS" => Self::Os,
            "Arch" => Self::Arch,
            "Version" => Self::Version,
            "Tag" => Self::Tag,
            "Binary" => Self::Binary,
            "ProjectName" => Self::ProjectName,
            _ => return None,
        };
        Some(placeholder)
    }

    /// The shell expression the installer computes this field into
    pub fn shell_var(self) -> &'static str {
        match self {
            Self::Os => "${OS}",
            Self::Arch => "${ARCH}",
            Self::Version => "${VERSION}",
            Self::Tag => "${TAG}",
            Self::Binary => "${BINARY}",
            Self::ProjectName => "${PROJECT_NAME}",
        }
    }
}

/// A parsed piece of a name template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameNode {
    /// Text copied as-is
    Literal {
        /// the text
        text: String,
        /// where it came from
        span: SourceSpan,
    },
    /// A recognized field
    Var {
        /// the field
        placeholder: Placeholder,
        /// where it came from
        span: SourceSpan,
    },
    /// A direct reference to `.Arm`
    ArmField {
        /// where it came from
        span: SourceSpan,
    },
    /// A field we have no shell equivalent for
    UnknownField {
        /// the field name (without the leading dot)
        field: String,
        /// where it came from
        span: SourceSpan,
    },
    /// `{{ if cond }}...{{ else }}...{{ end }}`
    If {
        /// the condition, verbatim
        condition: String,
        /// the nodes rendered when it holds
        then: Vec<NameNode>,
        /// the nodes rendered when it doesn't
        otherwise: Option<Vec<NameNode>>,
        /// covers the whole block
        span: SourceSpan,
    },
    /// Any other action (functions, pipelines, `range`, ...)
    Unsupported {
        /// the action, verbatim
        action: String,
        /// where it came from
        span: SourceSpan,
    },
}

impl NameNode {
    fn span(&self) -> SourceSpan {
        match self {
            NameNode::Literal { span, .. }
            | NameNode::Var { span, .. }
            | NameNode::ArmField { span }
            | NameNode::UnknownField { span, .. }
            | NameNode::If { span, .. }
            | NameNode::Unsupported { span, .. } => *span,
        }
    }

    fn is_var(&self, want: Placeholder) -> bool {
        matches!(self, NameNode::Var { placeholder, .. } if *placeholder == want)
    }

    /// Is this one of the `{{ if .Arm }}[v]{{ .Arm }}{{ end }}` suffixes?
    fn is_arm_suffix(&self) -> bool {
        let NameNode::If {
            condition,
            then,
            otherwise: None,
            ..
        } = self
        else {
            return false;
        };
        if !matches!(condition.as_str(), ".Arm" | "Arm") {
            return false;
        }
        match then.as_slice() {
            [NameNode::ArmField { .. }] => true,
            [NameNode::Literal { text, .. }, NameNode::ArmField { .. }] => text == "v",
            _ => false,
        }
    }
}

/// A name template, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    /// The template as written
    pub source: String,
    /// The parsed nodes
    pub nodes: Vec<NameNode>,
}

/// A shell assignment computed from a name template, like `NAME=${BINARY}_${OS}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedAssignment {
    /// The `VAR=` part
    pub prefix: String,
    /// The shell expression assigned
    pub shell_expression: String,
}

impl fmt::Display for TranslatedAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.shell_expression)
    }
}

/// Translate a name template into a shell assignment line
///
/// `translate("NAME=", "{{ .Binary }}_{{ .Os }}")` is `NAME=${BINARY}_${OS}`.
pub fn translate(prefix: &str, template: &str) -> DistResult<TranslatedAssignment> {
    let parsed = NameTemplate::parse(template)?.fold_arm_suffixes();
    parsed.reject_conditionals()?;
    let shell_expression = parsed.to_shell()?;
    Ok(TranslatedAssignment {
        prefix: prefix.to_owned(),
        shell_expression,
    })
}

impl NameTemplate {
    /// Parse a template without judging whether we can translate it
    pub fn parse(template: &str) -> DistResult<Self> {
        let tokens = tokenize(template)?;
        let nodes = build_tree(template, tokens)?;
        Ok(Self {
            source: template.to_owned(),
            nodes,
        })
    }

    /// Drop the ARM suffix idioms that directly follow an `.Arch`
    pub fn fold_arm_suffixes(mut self) -> Self {
        let mut folded: Vec<NameNode> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            let after_arch = folded
                .last()
                .map_or(false, |prev| prev.is_var(Placeholder::Arch));
            if after_arch && node.is_arm_suffix() {
                continue;
            }
            folded.push(node);
        }
        self.nodes = folded;
        self
    }

    /// Error out if any conditional or `.Arm` reference survived folding
    pub fn reject_conditionals(&self) -> DistResult<()> {
        let leftover = self
            .nodes
            .iter()
            .find(|node| matches!(node, NameNode::If { .. } | NameNode::ArmField { .. }));
        if let Some(node) = leftover {
            return Err(DistError::UnsupportedConditional {
                template: self.source.clone(),
                span: Some(node.span()),
            });
        }
        Ok(())
    }

    /// Render the nodes as a shell expression
    pub fn to_shell(&self) -> DistResult<String> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                NameNode::Literal { text, span } => {
                    if let Some(bad) = text.chars().find(|c| !is_shell_word_char(*c)) {
                        return Err(DistError::UnsafeLiteral {
                            template: self.source.clone(),
                            text: bad.to_string(),
                            span: Some(*span),
                        });
                    }
                    out.push_str(text);
                }
                NameNode::Var { placeholder, .. } => out.push_str(placeholder.shell_var()),
                NameNode::UnknownField { field, span } => {
                    return Err(DistError::UnknownPlaceholder {
                        template: self.source.clone(),
                        field: field.clone(),
                        span: Some(*span),
                    });
                }
                NameNode::Unsupported { action, span } => {
                    return Err(DistError::UnsupportedAction {
                        template: self.source.clone(),
                        action: action.clone(),
                        span: Some(*span),
                    });
                }
                NameNode::If { span, .. } | NameNode::ArmField { span } => {
                    return Err(DistError::UnsupportedConditional {
                        template: self.source.clone(),
                        span: Some(*span),
                    });
                }
            }
        }
        Ok(out)
    }
}

/// Characters that mean nothing special to sh in an unquoted assignment value
pub(crate) fn is_shell_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | ',' | '@' | '%' | ':' | '/' | '=')
}

#[derive(Debug)]
enum Token {
    Text { text: String, start: usize },
    Action { text: String, start: usize, end: usize },
}

/// Split a template into text and `{{ action }}` tokens, applying `{{-`/`-}}` trimming
fn tokenize(template: &str) -> DistResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest_start = 0;
    let mut trim_next_text = false;

    while let Some(open) = template[rest_start..].find("{{").map(|i| i + rest_start) {
        push_text(&mut tokens, &template[rest_start..open], rest_start, trim_next_text);

        let Some(close) = template[open + 2..].find("}}").map(|i| i + open + 2) else {
            return Err(DistError::MalformedTemplate {
                template: template.to_owned(),
                reason: "unclosed action".to_owned(),
                span: Some((open, template.len() - open).into()),
            });
        };
        let end = close + 2;
        let mut inner = &template[open + 2..close];

        if let Some(stripped) = inner
            .strip_prefix('-')
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_whitespace()))
        {
            inner = stripped;
            if let Some(Token::Text { text, .. }) = tokens.last_mut() {
                let trimmed_len = text.trim_end().len();
                text.truncate(trimmed_len);
                if text.is_empty() {
                    tokens.pop();
                }
            }
        }
        trim_next_text = false;
        if let Some(stripped) = inner
            .strip_suffix('-')
            .filter(|rest| rest.ends_with(|c: char| c.is_ascii_whitespace()))
        {
            inner = stripped;
            trim_next_text = true;
        }

        let text = inner.trim();
        if !(text.starts_with("/*") && text.ends_with("*/")) {
            tokens.push(Token::Action {
                text: text.to_owned(),
                start: open,
                end,
            });
        }
        rest_start = end;
    }
    push_text(&mut tokens, &template[rest_start..], rest_start, trim_next_text);

    Ok(tokens)
}

fn push_text(tokens: &mut Vec<Token>, text: &str, start: usize, trim_start: bool) {
    let (text, start) = if trim_start {
        let trimmed = text.trim_start();
        (trimmed, start + (text.len() - trimmed.len()))
    } else {
        (text, start)
    };
    if !text.is_empty() {
        tokens.push(Token::Text {
            text: text.to_owned(),
            start,
        });
    }
}

/// An `if` that hasn't seen its `end` yet
struct OpenIf {
    condition: String,
    start: usize,
    then: Vec<NameNode>,
    otherwise: Option<Vec<NameNode>>,
}

impl OpenIf {
    fn current(&mut self) -> &mut Vec<NameNode> {
        match &mut self.otherwise {
            Some(otherwise) => otherwise,
            None => &mut self.then,
        }
    }
}

fn build_tree(template: &str, tokens: Vec<Token>) -> DistResult<Vec<NameNode>> {
    let malformed = |reason: &str, start: usize, end: usize| DistError::MalformedTemplate {
        template: template.to_owned(),
        reason: reason.to_owned(),
        span: Some((start, end - start).into()),
    };

    let mut root = Vec::new();
    let mut open: Vec<OpenIf> = Vec::new();

    for token in tokens {
        let node = match token {
            Token::Text { text, start } => NameNode::Literal {
                span: (start, text.len()).into(),
                text,
            },
            Token::Action { text, start, end } => {
                let span: SourceSpan = (start, end - start).into();
                let mut words = text.splitn(2, char::is_whitespace);
                let keyword = words.next().unwrap_or_default();
                let rest = words.next().unwrap_or_default().trim();
                match keyword {
                    "if" => {
                        if rest.is_empty() {
                            return Err(malformed("if without a condition", start, end));
                        }
                        open.push(OpenIf {
                            condition: rest.to_owned(),
                            start,
                            then: Vec::new(),
                            otherwise: None,
                        });
                        continue;
                    }
                    "else" => {
                        let Some(block) = open.last_mut() else {
                            return Err(malformed("else outside of an if", start, end));
                        };
                        if block.otherwise.is_some() {
                            return Err(malformed("if has two else branches", start, end));
                        }
                        block.otherwise = Some(Vec::new());
                        if !rest.is_empty() {
                            // `else if` chains are conditionals all the same
                            block.current().push(NameNode::Unsupported {
                                action: text.clone(),
                                span,
                            });
                        }
                        continue;
                    }
                    "end" => {
                        let Some(block) = open.pop() else {
                            return Err(malformed("end without an if", start, end));
                        };
                        NameNode::If {
                            condition: block.condition,
                            then: block.then,
                            otherwise: block.otherwise,
                            span: (block.start, end - block.start).into(),
                        }
                    }
                    _ => classify_action(&text, span),
                }
            }
        };

        match open.last_mut() {
            Some(block) => block.current().push(node),
            None => root.push(node),
        }
    }

    if let Some(block) = open.last() {
        return Err(malformed("if without an end", block.start, template.len()));
    }
    Ok(root)
}

/// Work out what a non-control-flow action is
fn classify_action(text: &str, span: SourceSpan) -> NameNode {
    let is_ident = |s: &str| {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    };

    if let Some(field) = text.strip_prefix('.') {
        if is_ident(field) {
            return field_node(field, span);
        }
    } else if is_ident(text) && text.starts_with(|c: char| c.is_ascii_uppercase()) {
        // `{{ Binary }}` shorthand for `{{ .Binary }}`
        return field_node(text, span);
    }

    NameNode::Unsupported {
        action: text.to_owned(),
        span,
    }
}

fn field_node(field: &str, span: SourceSpan) -> NameNode {
    if field == "Arm" {
        return NameNode::ArmField { span };
    }
    match Placeholder::from_field(field) {
        Some(placeholder) => NameNode::Var { placeholder, span },
        None => NameNode::UnknownField {
            field: field.to_owned(),
            span,
        },
    }
}
