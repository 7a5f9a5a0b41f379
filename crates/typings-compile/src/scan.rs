//! Declaration file scanning.
//!
//! A declaration file is parsed once with `oxc` and reduced to owned data:
//! the module specifiers it imports, the ambient modules it declares, its
//! top-level export shape and every source range the rewriter may replace.
//! Nothing borrowed from the arena outlives [`scan_declaration`].

use std::ops::Range;

use oxc_allocator::Allocator;
use oxc_ast::Comment;
use oxc_ast::ast::{
    Declaration, ExportDefaultDeclarationKind, Statement, StringLiteral, TSModuleDeclaration, TSModuleDeclarationBody,
    TSModuleDeclarationName, TSModuleReference,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use crate::error::{CompileError, Result};

const DECLARE_KEYWORD: &str = "declare";

/// How a top-level export statement exposes the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportForm {
    /// `export const`, `export { .. }`, `export * from`.
    Named,
    /// `export default <expression>`.
    Default,
    /// `export default function` and friends: both named and default.
    DefaultDeclaration,
    /// `export = value`.
    Equals,
}

/// Where a specifier appears in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecifierKind {
    /// `'x'` in `import .. from 'x'`, `export .. from 'x'` or `declare module 'x'`.
    Literal,
    /// `require('x')` in `import x = require('x')`.
    Require,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpecifierSite {
    pub range: Range<usize>,
    pub value: String,
    pub kind: SpecifierKind,
}

/// Node kinds the compiler cares about, visited in source order.
pub(crate) trait DeclarationVisitor {
    /// A module specifier that can be rewritten.
    fn visit_specifier(&mut self, site: SpecifierSite);

    /// The name of a top-level `declare module "name"`.
    fn visit_module_declaration(&mut self, site: SpecifierSite);

    /// Range covering a `declare` keyword and the whitespace after it.
    fn visit_declare_keyword(&mut self, range: Range<usize>);

    fn visit_export(&mut self, form: ExportForm);

    /// A top-level statement that makes the file an external module.
    fn visit_module_indicator(&mut self);
}

/// Owned summary of one declaration file.
#[derive(Debug, Default)]
pub(crate) struct DeclarationFile {
    /// Specifiers in source order; module augmentations come last.
    pub imports: Vec<String>,
    /// `declare module "x"` names in a file that is not an external module.
    pub ambient_modules: Vec<String>,
    pub is_external: bool,
    pub specifiers: Vec<SpecifierSite>,
    pub declare_keywords: Vec<Range<usize>>,
    pub has_exports: bool,
    pub has_default_export: bool,
    pub has_export_equals: bool,
    module_declarations: Vec<String>,
}

impl DeclarationVisitor for DeclarationFile {
    fn visit_specifier(&mut self, site: SpecifierSite) {
        self.imports.push(site.value.clone());
        self.specifiers.push(site);
    }

    fn visit_module_declaration(&mut self, site: SpecifierSite) {
        self.module_declarations.push(site.value.clone());
        self.specifiers.push(site);
    }

    fn visit_declare_keyword(&mut self, range: Range<usize>) {
        self.declare_keywords.push(range);
    }

    fn visit_export(&mut self, form: ExportForm) {
        match form {
            ExportForm::Named => self.has_exports = true,
            ExportForm::Default => self.has_default_export = true,
            ExportForm::DefaultDeclaration => {
                self.has_exports = true;
                self.has_default_export = true;
            }
            ExportForm::Equals => self.has_export_equals = true,
        }
    }

    fn visit_module_indicator(&mut self) {
        self.is_external = true;
    }
}

impl DeclarationFile {
    fn finish(mut self) -> Self {
        let declarations = std::mem::take(&mut self.module_declarations);

        if self.is_external {
            // Augmentations of other modules behave like imports.
            for name in declarations {
                if !self.imports.contains(&name) {
                    self.imports.push(name);
                }
            }
        } else {
            self.ambient_modules = declarations;
        }

        self
    }
}

/// Parse `source` and summarize it.
pub(crate) fn scan_declaration(path: &str, source: &str) -> Result<DeclarationFile> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::d_ts()).parse();

    if ret.panicked {
        let message = ret
            .errors
            .first()
            .map(|err| err.to_string())
            .unwrap_or_else(|| "unrecoverable syntax error".to_string());
        return Err(CompileError::Syntax {
            path: path.to_string(),
            message,
        });
    }

    for err in &ret.errors {
        tracing::debug!(%path, error = %err, "recovered from syntax error");
    }

    let mut file = DeclarationFile::default();
    let mut walker = Walker {
        source,
        comments: &ret.program.comments,
        visitor: &mut file,
    };
    walker.walk_statements(&ret.program.body, true);

    Ok(file.finish())
}

struct Walker<'s, 'c, V> {
    source: &'s str,
    comments: &'c [Comment],
    visitor: &'c mut V,
}

impl<V: DeclarationVisitor> Walker<'_, '_, V> {
    fn walk_statements(&mut self, statements: &[Statement<'_>], top_level: bool) {
        for statement in statements {
            self.walk_statement(statement, top_level);
        }
    }

    fn walk_statement(&mut self, statement: &Statement<'_>, top_level: bool) {
        match statement {
            Statement::ImportDeclaration(import) => {
                self.module_indicator(top_level);
                self.literal(&import.source);
            }
            Statement::ExportAllDeclaration(export) => {
                self.export(top_level, ExportForm::Named);
                self.literal(&export.source);
            }
            Statement::ExportNamedDeclaration(export) => {
                self.export(top_level, ExportForm::Named);
                if let Some(source) = &export.source {
                    self.literal(source);
                }
                if let Some(declaration) = &export.declaration {
                    self.declare_keyword(declaration.span());
                    match declaration {
                        Declaration::TSModuleDeclaration(module) => self.walk_module(module, false),
                        Declaration::TSImportEqualsDeclaration(import) => self.require(&import.module_reference),
                        _ => {}
                    }
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                let form = match &export.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(_)
                    | ExportDefaultDeclarationKind::ClassDeclaration(_)
                    | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => ExportForm::DefaultDeclaration,
                    _ => ExportForm::Default,
                };
                self.export(top_level, form);
            }
            Statement::TSExportAssignment(_) => self.export(top_level, ExportForm::Equals),
            Statement::TSNamespaceExportDeclaration(_) => {}
            Statement::TSImportEqualsDeclaration(import) => {
                if matches!(import.module_reference, TSModuleReference::ExternalModuleReference(_)) {
                    self.module_indicator(top_level);
                }
                self.require(&import.module_reference);
            }
            Statement::TSModuleDeclaration(module) => {
                self.declare_keyword(module.span);
                self.walk_module(module, top_level);
            }
            other => self.declare_keyword(other.span()),
        }
    }

    fn walk_module(&mut self, module: &TSModuleDeclaration<'_>, top_level: bool) {
        if let TSModuleDeclarationName::StringLiteral(name) = &module.id {
            if top_level {
                self.visitor.visit_module_declaration(literal_site(name));
            }
        }

        match &module.body {
            Some(TSModuleDeclarationBody::TSModuleBlock(block)) => self.walk_statements(&block.body, false),
            Some(TSModuleDeclarationBody::TSModuleDeclaration(nested)) => self.walk_module(nested, false),
            None => {}
        }
    }

    fn export(&mut self, top_level: bool, form: ExportForm) {
        if top_level {
            self.visitor.visit_module_indicator();
            self.visitor.visit_export(form);
        }
    }

    fn module_indicator(&mut self, top_level: bool) {
        if top_level {
            self.visitor.visit_module_indicator();
        }
    }

    fn literal(&mut self, literal: &StringLiteral<'_>) {
        self.visitor.visit_specifier(literal_site(literal));
    }

    fn require(&mut self, reference: &TSModuleReference<'_>) {
        if let TSModuleReference::ExternalModuleReference(external) = reference {
            self.visitor.visit_specifier(SpecifierSite {
                range: range(external.span),
                value: external.expression.value.to_string(),
                kind: SpecifierKind::Require,
            });
        }
    }

    fn declare_keyword(&mut self, span: Span) {
        if let Some(range) = find_declare_keyword(self.source, span.start as usize, self.comments) {
            self.visitor.visit_declare_keyword(range);
        }
    }
}

fn literal_site(literal: &StringLiteral<'_>) -> SpecifierSite {
    SpecifierSite {
        range: range(literal.span),
        value: literal.value.to_string(),
        kind: SpecifierKind::Literal,
    }
}

fn range(span: Span) -> Range<usize> {
    span.start as usize..span.end as usize
}

/// Locate a `declare` modifier at `start`, or immediately before it.
fn find_declare_keyword(source: &str, start: usize, comments: &[Comment]) -> Option<Range<usize>> {
    let after = source.get(start..)?;
    if let Some(rest) = after.strip_prefix(DECLARE_KEYWORD) {
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            return Some(start..source.len() - trimmed.len());
        }
        return None;
    }

    let before = source.get(..start)?;
    let trimmed = before.trim_end();
    if trimmed.len() == before.len() {
        return None;
    }

    let keyword_start = trimmed.strip_suffix(DECLARE_KEYWORD)?.len();
    let at_boundary = trimmed[..keyword_start]
        .chars()
        .next_back()
        .is_none_or(char::is_whitespace);
    let in_comment = comments
        .iter()
        .any(|comment| (comment.span.start as usize) <= keyword_start && keyword_start < comment.span.end as usize);

    (at_boundary && !in_comment).then_some(keyword_start..start)
}
