//! Static pass over a computation's syntax tree
//!
//! Parses the `fn` item, collects local bindings, rejects hidden
//! dependencies and produces the normalized pools the fingerprint is hashed
//! from.
//!
//! Binding detection is flow-insensitive: a name bound anywhere in the
//! function counts as local everywhere in it. Macro bodies are analysed when
//! they parse as comma-separated expressions (`vec![x; n]` and `matches!`
//! are understood too); anything else is opaque.

use super::LogicViolation;
use proc_macro2::{Delimiter, Group, Spacing, Span, TokenStream, TokenTree};
use quote::ToTokens;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};
use syn::{
    BinOp, ConstParam, Expr, ExprAssign, ExprBinary, ExprCall, ExprIndex, ExprPath, FieldPat,
    FieldValue, Ident, ItemConst, ItemFn, ItemStatic, Lit, Macro, Pat, PatIdent, Receiver, Token,
};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "union", "unsafe", "use", "where", "while", "yield", "_",
];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64",
];

/// Path roots that name the standard library rather than the caller's crate
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];

/// Macros whose string literal may capture names inline (`"{x}"`)
const FORMAT_MACROS: &[&str] = &[
    "format", "format_args", "print", "println", "eprint", "eprintln", "write", "writeln",
    "panic", "unreachable", "todo", "unimplemented", "assert", "assert_eq", "assert_ne",
    "debug_assert", "debug_assert_eq", "debug_assert_ne",
];

/// Prefix given to local bindings before the token walk
const LOCAL_MARK: &str = "__ckpt_local_";

/// Stand-in for the function's own name, dropped from the instructions
const NAME_MARK: &str = "__ckpt_name";

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

fn is_screaming(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn starts_lowercase(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_lowercase() || c == '_')
}

/// Whether a path starting at `root` leads into a crate's own modules
fn is_module_root(root: &str) -> bool {
    matches!(root, "crate" | "self" | "super")
        || (starts_lowercase(root) && !PRIMITIVES.contains(&root) && !STD_ROOTS.contains(&root))
}

fn is_compound_assign(op: &BinOp) -> bool {
    matches!(
        op,
        BinOp::AddAssign(_)
            | BinOp::SubAssign(_)
            | BinOp::MulAssign(_)
            | BinOp::DivAssign(_)
            | BinOp::RemAssign(_)
            | BinOp::BitXorAssign(_)
            | BinOp::BitAndAssign(_)
            | BinOp::BitOrAssign(_)
            | BinOp::ShlAssign(_)
            | BinOp::ShrAssign(_)
    )
}

fn plain_name(ident: &Ident) -> String {
    ident.unraw().to_string()
}

/// Name of a path made of exactly one segment
fn single_ident(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(path) if path.qself.is_none() && path.path.leading_colon.is_none() => {
            path.path.get_ident().map(plain_name)
        }
        _ => None,
    }
}

/// Pools a fingerprint is computed from
#[derive(Debug, Serialize)]
pub struct FingerprintPools {
    /// Literals in first-appearance order, deduplicated
    pub constants: Vec<String>,
    /// Non-local identifiers in first-appearance order, deduplicated
    pub names: Vec<String>,
    /// Token stream with literals, names and locals replaced by pool slots
    pub instructions: Vec<String>,
}

/// Parsed computation with its local bindings
#[derive(Debug)]
pub struct SourceModel {
    item: ItemFn,
    locals: HashSet<String>,
}

impl SourceModel {
    /// Parse a `fn` item and collect its local bindings
    pub fn parse(source: &str) -> syn::Result<Self> {
        let item: ItemFn = syn::parse_str(source)?;
        let mut bindings = Bindings::default();
        bindings.visit_item_fn(&item);
        Ok(Self {
            item,
            locals: bindings.names,
        })
    }

    /// Reject captured state, module-level access and local statics
    pub fn check(&self) -> Result<(), LogicViolation> {
        let mut checker = Checker {
            locals: &self.locals,
            storing: false,
            violation: None,
        };
        checker.visit_item_fn(&self.item);
        checker.violation.map_or(Ok(()), Err)
    }

    /// Normalize the item into fingerprint pools
    pub fn pools(&self) -> FingerprintPools {
        let mut item = self.item.clone();
        item.attrs.clear();
        item.sig.ident = Ident::new(NAME_MARK, Span::call_site());
        LocalMarker {
            locals: &self.locals,
        }
        .visit_item_fn_mut(&mut item);

        let mut flat = Flattener::default();
        flat.walk(item.into_token_stream());
        FingerprintPools {
            constants: flat.constants.into_values(),
            names: flat.names.into_values(),
            instructions: flat.instructions,
        }
    }
}

/// Contents of a macro invocation, when they parse as Rust syntax
enum MacroBody {
    /// Comma-separated expressions; `label = value` arguments keep the value
    Exprs {
        args: Vec<Expr>,
        labels: HashSet<String>,
    },
    /// `matches!(scrutinee, pattern if guard)`
    Matches {
        scrutinee: Expr,
        pattern: Pat,
        guard: Option<Expr>,
    },
    Opaque,
}

impl MacroBody {
    fn parse(mac: &Macro) -> Self {
        if mac.path.is_ident("matches") {
            return mac.parse_body_with(parse_matches).unwrap_or(Self::Opaque);
        }
        if let Ok(list) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            let mut labels = HashSet::new();
            let args = list
                .into_iter()
                .map(|arg| match arg {
                    Expr::Assign(assign) => match single_ident(&assign.left) {
                        Some(label) => {
                            labels.insert(label);
                            *assign.right
                        }
                        None => Expr::Assign(assign),
                    },
                    other => other,
                })
                .collect();
            return Self::Exprs { args, labels };
        }
        mac.parse_body_with(parse_repeat).unwrap_or(Self::Opaque)
    }

    /// Names a format string captures inline, minus named arguments
    fn format_captures(&self, mac: &Macro) -> Vec<String> {
        let Self::Exprs { args, labels } = self else {
            return Vec::new();
        };
        let is_format = mac
            .path
            .segments
            .last()
            .is_some_and(|s| FORMAT_MACROS.contains(&s.ident.to_string().as_str()));
        if !is_format {
            return Vec::new();
        }

        let template = args.iter().find_map(|arg| match arg {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        });
        template
            .map(|t| inline_names(&t))
            .unwrap_or_default()
            .into_iter()
            .filter(|name| !labels.contains(name))
            .collect()
    }

    fn walk<V>(&self, visitor: &mut V)
    where
        V: for<'a> Visit<'a>,
    {
        match self {
            Self::Exprs { args, .. } => {
                for arg in args {
                    visitor.visit_expr(arg);
                }
            }
            Self::Matches {
                scrutinee,
                pattern,
                guard,
            } => {
                visitor.visit_expr(scrutinee);
                visitor.visit_pat(pattern);
                if let Some(guard) = guard {
                    visitor.visit_expr(guard);
                }
            }
            Self::Opaque => {}
        }
    }
}

fn parse_matches(input: ParseStream) -> syn::Result<MacroBody> {
    let scrutinee: Expr = input.parse()?;
    input.parse::<Token![,]>()?;
    let pattern = Pat::parse_multi_with_leading_vert(input)?;
    let guard = if input.peek(Token![if]) {
        input.parse::<Token![if]>()?;
        Some(input.parse::<Expr>()?)
    } else {
        None
    };
    input.parse::<Option<Token![,]>>()?;
    Ok(MacroBody::Matches {
        scrutinee,
        pattern,
        guard,
    })
}

fn parse_repeat(input: ParseStream) -> syn::Result<MacroBody> {
    let value: Expr = input.parse()?;
    input.parse::<Token![;]>()?;
    let count: Expr = input.parse()?;
    Ok(MacroBody::Exprs {
        args: vec![value, count],
        labels: HashSet::new(),
    })
}

/// Identifiers named by `{name}` / `{name:?}` placeholders
fn inline_names(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
            }
            '{' => {
                let placeholder: String = chars.by_ref().take_while(|&c| c != '}').collect();
                let arg = placeholder.split(':').next().unwrap_or_default().trim();
                if arg != "_" && arg.starts_with(|c: char| c.is_alphabetic() || c == '_') {
                    names.push(arg.to_string());
                }
            }
            _ => {}
        }
    }
    names
}

/// Every name bound anywhere in the function
#[derive(Default)]
struct Bindings {
    names: HashSet<String>,
}

impl<'ast> Visit<'ast> for Bindings {
    fn visit_pat_ident(&mut self, node: &'ast PatIdent) {
        let name = plain_name(&node.ident);
        if starts_lowercase(&name) {
            self.names.insert(name);
        }
        visit::visit_pat_ident(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast ItemConst) {
        self.names.insert(plain_name(&node.ident));
        visit::visit_item_const(self, node);
    }

    fn visit_const_param(&mut self, node: &'ast ConstParam) {
        self.names.insert(plain_name(&node.ident));
        visit::visit_const_param(self, node);
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        MacroBody::parse(node).walk(self);
    }
}

/// Finds the first hidden dependency
struct Checker<'l> {
    locals: &'l HashSet<String>,
    /// Inside the target of an assignment
    storing: bool,
    violation: Option<LogicViolation>,
}

impl Checker<'_> {
    fn flag(&mut self, violation: LogicViolation) {
        if self.violation.is_none() {
            self.violation = Some(violation);
        }
    }

    fn global_access(&mut self, name: &str) {
        let name = name.to_string();
        let violation = if self.storing {
            LogicViolation::GlobalWrite { name }
        } else {
            LogicViolation::GlobalRead { name }
        };
        self.flag(violation);
    }

    /// A lone identifier in value position
    fn check_name(&mut self, name: &str) {
        if name == "self" {
            return self.flag(LogicViolation::ReceiverState);
        }
        if self.locals.contains(name) {
            return;
        }
        if is_screaming(name) {
            return self.global_access(name);
        }
        if starts_lowercase(name) && !PRIMITIVES.contains(&name) {
            self.flag(LogicViolation::CapturedVariable {
                name: name.to_string(),
            });
        }
    }

    fn check_path(&mut self, node: &ExprPath) {
        if node.qself.is_some() {
            return;
        }
        let segments: Vec<String> = node
            .path
            .segments
            .iter()
            .map(|s| plain_name(&s.ident))
            .collect();
        match segments.as_slice() {
            [name] if node.path.leading_colon.is_none() => self.check_name(name),
            [root, .., last] if is_screaming(last) && is_module_root(root) => {
                self.global_access(last)
            }
            _ => {}
        }
    }

    fn visit_target(&mut self, target: &Expr) {
        let outer = std::mem::replace(&mut self.storing, true);
        self.visit_expr(target);
        self.storing = outer;
    }
}

impl<'ast> Visit<'ast> for Checker<'_> {
    fn visit_receiver(&mut self, _node: &'ast Receiver) {
        self.flag(LogicViolation::ReceiverState);
    }

    fn visit_item_static(&mut self, node: &'ast ItemStatic) {
        self.flag(LogicViolation::StaticDeclaration {
            name: plain_name(&node.ident),
        });
    }

    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        self.check_path(node);
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        // a bare callee names a function or constructor, not a captured value
        if single_ident(&node.func).is_none() {
            self.visit_expr(&node.func);
        }
        for arg in &node.args {
            self.visit_expr(arg);
        }
    }

    fn visit_expr_assign(&mut self, node: &'ast ExprAssign) {
        self.visit_target(&node.left);
        self.visit_expr(&node.right);
    }

    fn visit_expr_binary(&mut self, node: &'ast ExprBinary) {
        if is_compound_assign(&node.op) {
            self.visit_target(&node.left);
        } else {
            self.visit_expr(&node.left);
        }
        self.visit_expr(&node.right);
    }

    fn visit_expr_index(&mut self, node: &'ast ExprIndex) {
        self.visit_expr(&node.expr);
        let outer = std::mem::replace(&mut self.storing, false);
        self.visit_expr(&node.index);
        self.storing = outer;
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        if node.path.is_ident("thread_local") {
            return self.flag(LogicViolation::ThreadLocal);
        }
        let body = MacroBody::parse(node);
        for name in body.format_captures(node) {
            self.check_name(&name);
        }
        body.walk(self);
    }
}

/// Renames every local binding to a marked identifier
struct LocalMarker<'l> {
    locals: &'l HashSet<String>,
}

impl LocalMarker<'_> {
    fn mark(&self, ident: &mut Ident) {
        let name = plain_name(ident);
        if self.locals.contains(&name) {
            *ident = Ident::new(&format!("{LOCAL_MARK}{name}"), ident.span());
        }
    }

    /// Mark locals inside an opaque macro token stream
    fn mark_tokens(&self, stream: TokenStream) -> TokenStream {
        let tokens: Vec<TokenTree> = stream.into_iter().collect();
        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| match token {
                TokenTree::Group(group) => {
                    let mut marked = Group::new(group.delimiter(), self.mark_tokens(group.stream()));
                    marked.set_span(group.span());
                    TokenTree::Group(marked)
                }
                TokenTree::Ident(ident) if !is_member(&tokens, i) => {
                    let mut ident = ident.clone();
                    self.mark(&mut ident);
                    TokenTree::Ident(ident)
                }
                other => other.clone(),
            })
            .collect()
    }
}

fn is_punct(token: Option<&TokenTree>, ch: char) -> bool {
    matches!(token, Some(TokenTree::Punct(p)) if p.as_char() == ch)
}

/// Whether the identifier at `i` is a field, method or path segment
fn is_member(tokens: &[TokenTree], i: usize) -> bool {
    let before = |back: usize| i.checked_sub(back).and_then(|j| tokens.get(j));
    let after_path = is_punct(before(1), ':')
        && matches!(before(2), Some(TokenTree::Punct(p)) if p.as_char() == ':' && p.spacing() == Spacing::Joint);
    let before_path = matches!(
        tokens.get(i + 1),
        Some(TokenTree::Punct(p)) if p.as_char() == ':' && p.spacing() == Spacing::Joint
    );
    is_punct(before(1), '.') || after_path || before_path
}

impl VisitMut for LocalMarker<'_> {
    fn visit_pat_ident_mut(&mut self, node: &mut PatIdent) {
        self.mark(&mut node.ident);
        visit_mut::visit_pat_ident_mut(self, node);
    }

    fn visit_expr_path_mut(&mut self, node: &mut ExprPath) {
        if node.qself.is_none() && node.path.leading_colon.is_none() && node.path.segments.len() == 1 {
            self.mark(&mut node.path.segments[0].ident);
        }
        visit_mut::visit_expr_path_mut(self, node);
    }

    // `P { x }` is printed as `P { x: x }` so shorthand and renamed fields agree
    fn visit_field_value_mut(&mut self, node: &mut FieldValue) {
        if node.colon_token.is_none() {
            node.colon_token = Some(Default::default());
        }
        visit_mut::visit_field_value_mut(self, node);
    }

    fn visit_field_pat_mut(&mut self, node: &mut FieldPat) {
        if node.colon_token.is_none() {
            node.colon_token = Some(Default::default());
        }
        visit_mut::visit_field_pat_mut(self, node);
    }

    fn visit_item_const_mut(&mut self, node: &mut ItemConst) {
        self.mark(&mut node.ident);
        visit_mut::visit_item_const_mut(self, node);
    }

    fn visit_const_param_mut(&mut self, node: &mut ConstParam) {
        self.mark(&mut node.ident);
        visit_mut::visit_const_param_mut(self, node);
    }

    fn visit_macro_mut(&mut self, node: &mut Macro) {
        node.tokens = self.mark_tokens(std::mem::take(&mut node.tokens));
    }
}

/// Length of a `#[doc ...]` / `#![doc ...]` attribute at the start of `tokens`
fn doc_attribute_len(tokens: &[TokenTree]) -> Option<usize> {
    if !is_punct(tokens.first(), '#') {
        return None;
    }
    let at = if is_punct(tokens.get(1), '!') { 2 } else { 1 };
    match tokens.get(at) {
        Some(TokenTree::Group(group)) if group.delimiter() == Delimiter::Bracket => {
            let first = group.stream().into_iter().next();
            matches!(first, Some(TokenTree::Ident(ident)) if ident == "doc").then_some(at + 1)
        }
        _ => None,
    }
}

/// Flattens a token stream into pooled instructions
#[derive(Default)]
struct Flattener {
    constants: Interner,
    names: Interner,
    locals: Interner,
    instructions: Vec<String>,
}

impl Flattener {
    fn walk(&mut self, stream: TokenStream) {
        let tokens: Vec<TokenTree> = stream.into_iter().collect();
        let mut i = 0;
        while i < tokens.len() {
            if let Some(len) = doc_attribute_len(&tokens[i..]) {
                i += len;
                continue;
            }
            match &tokens[i] {
                TokenTree::Group(group) => {
                    let (open, close) = match group.delimiter() {
                        Delimiter::Parenthesis => ("(", ")"),
                        Delimiter::Brace => ("{", "}"),
                        Delimiter::Bracket => ("[", "]"),
                        Delimiter::None => ("", ""),
                    };
                    if !open.is_empty() {
                        self.instructions.push(open.to_string());
                    }
                    self.walk(group.stream());
                    if !close.is_empty() {
                        self.instructions.push(close.to_string());
                    }
                }
                TokenTree::Ident(ident) => {
                    let text = ident.to_string();
                    if text != NAME_MARK {
                        let op = if let Some(local) = text.strip_prefix(LOCAL_MARK) {
                            format!("${}", self.locals.intern(local))
                        } else if is_keyword(&text) {
                            text
                        } else {
                            format!("@{}", self.names.intern(&text))
                        };
                        self.instructions.push(op);
                    }
                }
                TokenTree::Punct(punct) => self.instructions.push(punct.as_char().to_string()),
                TokenTree::Literal(lit) => {
                    let slot = self.constants.intern(&lit.to_string());
                    self.instructions.push(format!("#{}", slot));
                }
            }
            i += 1;
        }
    }
}

/// Deduplicating pool that hands out first-appearance indices
#[derive(Default)]
struct Interner {
    index: HashMap<String, usize>,
    values: Vec<String>,
}

impl Interner {
    fn intern(&mut self, value: &str) -> usize {
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.values.len();
        self.index.insert(value.to_string(), i);
        self.values.push(value.to_string());
        i
    }

    fn into_values(self) -> Vec<String> {
        self.values
    }
}
