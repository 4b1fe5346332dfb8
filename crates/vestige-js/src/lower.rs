//! Lowering from the oxc AST to the engine's construct sum type.
//!
//! The engine never sees oxc node shapes; this module walks a parsed
//! program twice. A statement-level pass lowers import/export constructs
//! (including the CommonJS forms) and classifies re-export-position
//! identifiers; a full AST walk then collects dynamic-load call sites and
//! every identifier reference with its member-access chain.

use crate::annotations;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    AssignmentExpression, AssignmentTarget, BindingPatternKind, CallExpression, Declaration,
    ExportAllDeclaration, ExportDefaultDeclaration, ExportNamedDeclaration, Expression,
    IdentifierReference, ImportDeclaration, ImportDeclarationSpecifier, ImportExpression,
    ModuleExportName, ObjectExpression, ObjectPropertyKind, Program, PropertyKey, Statement,
    StaticMemberExpression,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use rustc_hash::FxHashSet;
use std::path::Path;
use vestige_graph::{Construct, ImportClause, ModuleSummary, SymbolReference};

/// Parses and lowers one source file. Returns a failed summary when the
/// source does not parse; the caller stubs the file and continues.
pub fn lower_source(source_text: &str, path: &Path) -> ModuleSummary {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());
    let parsed = Parser::new(&allocator, source_text, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        tracing::debug!(path = %path.display(), errors = parsed.errors.len(), "parse failed");
        return ModuleSummary::failed();
    }
    lower_program(&parsed.program, source_text)
}

fn lower_program(program: &Program<'_>, source_text: &str) -> ModuleSummary {
    let mut lowering = Lowering::default();
    for statement in &program.body {
        lowering.lower_statement(statement);
    }

    let mut collector = ReferenceCollector {
        source_text,
        references: Vec::new(),
        constructs: Vec::new(),
        handled_spans: lowering.handled_spans,
    };
    collector.visit_program(program);

    let mut constructs = lowering.constructs;
    constructs.extend(collector.constructs);
    let mut references = lowering.references;
    references.extend(collector.references);

    ModuleSummary {
        constructs,
        references,
        parse_failed: false,
    }
}

/// Statement-level lowering state.
#[derive(Default)]
struct Lowering {
    constructs: Vec<Construct>,
    references: Vec<SymbolReference>,
    /// Spans the reference walk must treat specially: require calls bound
    /// by a declarator and module.exports assignments already lowered.
    handled_spans: FxHashSet<Span>,
}

impl Lowering {
    fn lower_statement(&mut self, statement: &Statement<'_>) {
        match statement {
            Statement::ImportDeclaration(decl) => self.lower_import(decl),
            Statement::ExportNamedDeclaration(decl) => self.lower_export_named(decl),
            Statement::ExportDefaultDeclaration(decl) => self.lower_export_default(decl),
            Statement::ExportAllDeclaration(decl) => self.lower_export_all(decl),
            Statement::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    let Some(init) = &declarator.init else {
                        continue;
                    };
                    let Some(specifier) = require_specifier(init) else {
                        continue;
                    };
                    let clauses = require_clauses(&declarator.id.kind);
                    self.handled_spans.insert(init.span());
                    self.constructs.push(Construct::StaticImport { specifier, clauses });
                }
            }
            Statement::ExpressionStatement(stmt) => {
                if let Some(specifier) = require_specifier(&stmt.expression) {
                    // Bare `require("m")`: a side-effect import.
                    self.handled_spans.insert(stmt.expression.span());
                    self.constructs.push(Construct::StaticImport {
                        specifier,
                        clauses: vec![],
                    });
                } else if let Expression::AssignmentExpression(assign) = &stmt.expression {
                    self.lower_cjs_export(assign);
                }
            }
            _ => {}
        }
    }

    fn lower_import(&mut self, decl: &ImportDeclaration<'_>) {
        let mut clauses = Vec::new();
        if let Some(specifiers) = &decl.specifiers {
            for specifier in specifiers {
                clauses.push(match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => ImportClause::Named {
                        imported: module_export_name(&s.imported),
                        local: s.local.name.to_string(),
                    },
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                        ImportClause::Default {
                            local: s.local.name.to_string(),
                        }
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        ImportClause::Namespace {
                            local: s.local.name.to_string(),
                        }
                    }
                });
            }
        }
        self.constructs.push(Construct::StaticImport {
            specifier: decl.source.value.to_string(),
            clauses,
        });
    }

    fn lower_export_named(&mut self, decl: &ExportNamedDeclaration<'_>) {
        if let Some(declaration) = &decl.declaration {
            for name in declared_names(declaration) {
                self.constructs.push(Construct::ExportLocal { name });
            }
        }
        match &decl.source {
            Some(source) => {
                for specifier in &decl.specifiers {
                    self.constructs.push(Construct::ExportFrom {
                        specifier: source.value.to_string(),
                        imported: module_export_name(&specifier.local),
                        exported: module_export_name(&specifier.exported),
                    });
                }
            }
            None => {
                for specifier in &decl.specifiers {
                    let local = module_export_name(&specifier.local);
                    // The specifier's mention of the local name is the
                    // re-export itself, not a use.
                    self.references
                        .push(SymbolReference::re_export(local.clone()));
                    self.constructs.push(Construct::ExportAlias {
                        exported: module_export_name(&specifier.exported),
                        local,
                    });
                }
            }
        }
    }

    fn lower_export_default(&mut self, decl: &ExportDefaultDeclaration<'_>) {
        match decl.declaration.as_expression() {
            Some(Expression::Identifier(ident)) => {
                let local = ident.name.to_string();
                self.references
                    .push(SymbolReference::re_export(local.clone()));
                self.constructs.push(Construct::ExportAlias {
                    exported: DEFAULT.to_string(),
                    local,
                });
            }
            Some(Expression::ObjectExpression(object)) => {
                let members = self.lower_object_members(object);
                self.constructs.push(Construct::ExportObject {
                    exported: DEFAULT.to_string(),
                    members,
                });
            }
            _ => {
                self.constructs.push(Construct::ExportLocal {
                    name: DEFAULT.to_string(),
                });
            }
        }
    }

    fn lower_export_all(&mut self, decl: &ExportAllDeclaration<'_>) {
        self.constructs.push(Construct::ExportStarFrom {
            specifier: decl.source.value.to_string(),
            alias: decl.exported.as_ref().map(module_export_name),
        });
    }

    /// `module.exports = …`, `module.exports.name = …`, `exports.name = …`.
    fn lower_cjs_export(&mut self, assign: &AssignmentExpression<'_>) {
        let Some(exported) = cjs_export_target(&assign.left) else {
            return;
        };
        let exported = exported.unwrap_or_else(|| DEFAULT.to_string());
        match &assign.right {
            Expression::Identifier(ident) => {
                let local = ident.name.to_string();
                self.references
                    .push(SymbolReference::re_export(local.clone()));
                self.handled_spans.insert(assign.span);
                self.constructs
                    .push(Construct::ExportAlias { exported, local });
            }
            Expression::ObjectExpression(object) => {
                let members = self.lower_object_members(object);
                self.handled_spans.insert(assign.span);
                self.constructs
                    .push(Construct::ExportObject { exported, members });
            }
            _ => {
                self.constructs
                    .push(Construct::ExportLocal { name: exported });
            }
        }
    }

    /// Members of a factory-style export object. Identifier-valued members
    /// alias the named local and are recorded as re-export positions.
    fn lower_object_members(
        &mut self,
        object: &ObjectExpression<'_>,
    ) -> Vec<(String, Option<String>)> {
        let mut members = Vec::new();
        for property in &object.properties {
            let ObjectPropertyKind::ObjectProperty(property) = property else {
                continue;
            };
            let Some(name) = property_key_name(&property.key) else {
                continue;
            };
            let local = match &property.value {
                Expression::Identifier(ident) => {
                    let local = ident.name.to_string();
                    self.references
                        .push(SymbolReference::re_export(local.clone()));
                    Some(local)
                }
                _ => None,
            };
            members.push((name, local));
        }
        members
    }
}

const DEFAULT: &str = vestige_graph::DEFAULT_EXPORT;

fn module_export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(literal) => literal.value.to_string(),
    }
}

fn property_key_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        PropertyKey::StringLiteral(literal) => Some(literal.value.to_string()),
        _ => None,
    }
}

/// Names bound by an exported declaration.
fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    let mut names = Vec::new();
    match declaration {
        Declaration::VariableDeclaration(decl) => {
            for declarator in &decl.declarations {
                collect_binding_names(&declarator.id.kind, &mut names);
            }
        }
        Declaration::FunctionDeclaration(decl) => {
            if let Some(id) = &decl.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::ClassDeclaration(decl) => {
            if let Some(id) = &decl.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::TSTypeAliasDeclaration(decl) => names.push(decl.id.name.to_string()),
        Declaration::TSInterfaceDeclaration(decl) => names.push(decl.id.name.to_string()),
        Declaration::TSEnumDeclaration(decl) => names.push(decl.id.name.to_string()),
        _ => {}
    }
    names
}

fn collect_binding_names(kind: &BindingPatternKind<'_>, names: &mut Vec<String>) {
    match kind {
        BindingPatternKind::BindingIdentifier(ident) => names.push(ident.name.to_string()),
        BindingPatternKind::ObjectPattern(pattern) => {
            for property in &pattern.properties {
                collect_binding_names(&property.value.kind, names);
            }
            if let Some(rest) = &pattern.rest {
                collect_binding_names(&rest.argument.kind, names);
            }
        }
        BindingPatternKind::ArrayPattern(pattern) => {
            for element in pattern.elements.iter().flatten() {
                collect_binding_names(&element.kind, names);
            }
            if let Some(rest) = &pattern.rest {
                collect_binding_names(&rest.argument.kind, names);
            }
        }
        BindingPatternKind::AssignmentPattern(pattern) => {
            collect_binding_names(&pattern.left.kind, names);
        }
    }
}

/// `require("m")` → the specifier.
fn require_specifier(expression: &Expression<'_>) -> Option<String> {
    let Expression::CallExpression(call) = expression else {
        return None;
    };
    require_call_specifier(call)
}

fn require_call_specifier(call: &CallExpression<'_>) -> Option<String> {
    let Expression::Identifier(callee) = &call.callee else {
        return None;
    };
    if callee.name != "require" || call.arguments.len() != 1 {
        return None;
    }
    match call.arguments[0].as_expression() {
        Some(Expression::StringLiteral(literal)) => Some(literal.value.to_string()),
        _ => None,
    }
}

/// Import clauses for the binding side of `const … = require("m")`.
fn require_clauses(kind: &BindingPatternKind<'_>) -> Vec<ImportClause> {
    match kind {
        BindingPatternKind::BindingIdentifier(ident) => vec![ImportClause::Namespace {
            local: ident.name.to_string(),
        }],
        BindingPatternKind::ObjectPattern(pattern) => {
            let mut clauses = Vec::new();
            for property in &pattern.properties {
                let Some(imported) = property_key_name(&property.key) else {
                    continue;
                };
                if let BindingPatternKind::BindingIdentifier(local) = &property.value.kind {
                    clauses.push(ImportClause::Named {
                        imported,
                        local: local.name.to_string(),
                    });
                }
            }
            clauses
        }
        _ => vec![],
    }
}

/// Classifies a CommonJS export assignment target.
///
/// Returns `Some(None)` for `module.exports = …`, `Some(Some(name))` for
/// `module.exports.name = …` / `exports.name = …`, `None` for anything
/// else.
fn cjs_export_target(target: &AssignmentTarget<'_>) -> Option<Option<String>> {
    let AssignmentTarget::StaticMemberExpression(member) = target else {
        return None;
    };
    match &member.object {
        Expression::Identifier(object) if object.name == "module" => {
            if member.property.name == "exports" {
                Some(None)
            } else {
                None
            }
        }
        Expression::Identifier(object) if object.name == "exports" => {
            Some(Some(member.property.name.to_string()))
        }
        Expression::StaticMemberExpression(inner) => {
            let Expression::Identifier(object) = &inner.object else {
                return None;
            };
            if object.name == "module" && inner.property.name == "exports" {
                Some(Some(member.property.name.to_string()))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Builds the member chain `a.b.c` → `["a", "b", "c"]` when the chain is
/// rooted at a plain identifier.
fn member_chain(expr: &StaticMemberExpression<'_>) -> Option<Vec<String>> {
    let mut reversed = vec![expr.property.name.to_string()];
    let mut object = &expr.object;
    loop {
        match object {
            Expression::StaticMemberExpression(inner) => {
                reversed.push(inner.property.name.to_string());
                object = &inner.object;
            }
            Expression::Identifier(ident) => {
                reversed.push(ident.name.to_string());
                reversed.reverse();
                return Some(reversed);
            }
            _ => return None,
        }
    }
}

/// Full-AST walk: identifier references, member chains, dynamic-load call
/// sites, and require calls in expression position.
struct ReferenceCollector<'a> {
    source_text: &'a str,
    references: Vec<SymbolReference>,
    constructs: Vec<Construct>,
    handled_spans: FxHashSet<Span>,
}

impl<'a> ReferenceCollector<'a> {
    fn span_text(&self, span: Span) -> &'a str {
        &self.source_text[span.start as usize..span.end as usize]
    }
}

impl<'a> Visit<'a> for ReferenceCollector<'a> {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.references
            .push(SymbolReference::using(vec![ident.name.to_string()]));
    }

    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        if let Some(path) = member_chain(expr) {
            // The chain is fully captured; its identifiers are not separate
            // references.
            self.references.push(SymbolReference::using(path));
            return;
        }
        walk::walk_static_member_expression(self, expr);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &expr.source {
            let chunk_name = annotations::chunk_name_in(self.span_text(expr.span));
            self.constructs.push(Construct::DynamicImport {
                specifier: literal.value.to_string(),
                chunk_name,
            });
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(specifier) = require_call_specifier(call) {
            if !self.handled_spans.contains(&call.span) {
                // A require in expression position still creates the edge.
                self.constructs.push(Construct::StaticImport {
                    specifier,
                    clauses: vec![],
                });
            }
            // `require` itself and the specifier literal are not
            // references either way.
            return;
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_import_declaration(&mut self, _decl: &ImportDeclaration<'a>) {
        // Import specifier locals are declarations, not uses.
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        // Specifier identifiers were lowered as re-export positions; only
        // an inline declaration body contains real references.
        if let Some(declaration) = &decl.declaration {
            self.visit_declaration(declaration);
        }
    }

    fn visit_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'a>) {
        match decl.declaration.as_expression() {
            // A bare identifier is the re-export position itself.
            Some(Expression::Identifier(_)) => {}
            // Identifier members of a factory object were recorded as
            // re-export positions; only non-identifier values hold uses.
            Some(Expression::ObjectExpression(object)) => {
                for property in &object.properties {
                    if let ObjectPropertyKind::ObjectProperty(property) = property {
                        if !matches!(&property.value, Expression::Identifier(_)) {
                            self.visit_expression(&property.value);
                        }
                    }
                }
            }
            Some(expression) => self.visit_expression(expression),
            None => walk::walk_export_default_declaration(self, decl),
        }
    }

    fn visit_export_all_declaration(&mut self, _decl: &ExportAllDeclaration<'a>) {}

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        if self.handled_spans.contains(&assign.span) {
            // Lowered module.exports assignment: identifier values were
            // recorded as re-export positions; walk only the member values
            // that are real expressions.
            if let Expression::ObjectExpression(object) = &assign.right {
                for property in &object.properties {
                    if let ObjectPropertyKind::ObjectProperty(property) = property {
                        if !matches!(&property.value, Expression::Identifier(_)) {
                            self.visit_expression(&property.value);
                        }
                    }
                }
            }
            return;
        }
        walk::walk_assignment_expression(self, assign);
    }
}
