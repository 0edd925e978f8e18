use crate::ast::{Expr, Stmt, SyntaxTree, TypeClause};
use crate::bound_tree::{BoundExpression, BoundStatement};
use crate::conversion::Conversion;
use crate::error::{DiagnosticBag, TextSpan};
use crate::lexer::{Token, TokenType};
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::scope::BoundScope;
use crate::symbols::{BuiltinFunction, TypeSymbol, VariableKind, VariableSymbol};
use std::rc::Rc;

/// The result of binding one submission: the globals it declared, its
/// diagnostics (lexical, syntax and semantic, in source order) and the
/// bound program.
#[derive(Debug)]
pub struct BoundGlobalScope {
    pub previous: Option<Rc<BoundGlobalScope>>,
    pub diagnostics: DiagnosticBag,
    pub variables: Vec<VariableSymbol>,
    pub statement: Rc<BoundStatement>,
}

/// Binds `syntax_tree` on top of the globals of `previous` and of the
/// submissions before it.
pub fn bind_global_scope(previous: Option<Rc<BoundGlobalScope>>, syntax_tree: &SyntaxTree) -> BoundGlobalScope {
    let parent = create_parent_scope(previous.as_deref());
    let mut binder = Binder::new(parent);

    let statements = syntax_tree
        .root
        .statements
        .iter()
        .map(|statement| binder.bind_statement(statement))
        .collect();

    let variables = binder.scope.declared_variables();
    let mut diagnostics = syntax_tree.diagnostics.clone();
    diagnostics.extend(binder.diagnostics);
    diagnostics.sort_by_position();

    tracing::debug!(
        variables = variables.len(),
        diagnostics = diagnostics.len(),
        "bound global scope"
    );

    BoundGlobalScope {
        previous,
        diagnostics,
        variables,
        statement: Rc::new(BoundStatement::Block { statements }),
    }
}

/// Rebuilds the scope chain of earlier submissions, oldest outermost, so a
/// later submission can shadow an earlier global.
fn create_parent_scope(previous: Option<&BoundGlobalScope>) -> Option<BoundScope> {
    let mut chain = Vec::new();
    let mut current = previous;
    while let Some(global_scope) = current {
        chain.push(global_scope);
        current = global_scope.previous.as_deref();
    }

    let mut parent: Option<BoundScope> = None;
    for global_scope in chain.into_iter().rev() {
        let mut scope = match parent.take() {
            Some(parent) => BoundScope::with_parent(parent),
            None => BoundScope::new(),
        };
        for variable in &global_scope.variables {
            scope.try_declare(variable.clone());
        }
        parent = Some(scope);
    }

    parent
}

pub struct Binder {
    scope: BoundScope,
    diagnostics: DiagnosticBag,
    depth: usize,
}

impl Binder {
    pub fn new(parent: Option<BoundScope>) -> Self {
        let scope = match parent {
            Some(parent) => BoundScope::with_parent(parent),
            None => BoundScope::new(),
        };

        Self {
            scope,
            diagnostics: DiagnosticBag::new(),
            depth: 0,
        }
    }

    fn push_scope(&mut self) {
        let parent = std::mem::take(&mut self.scope);
        self.scope = BoundScope::with_parent(parent);
        self.depth += 1;
    }

    fn pop_scope(&mut self) {
        if let Some(parent) = self.scope.take_parent() {
            self.scope = parent;
        }
        self.depth -= 1;
    }

    // Statements

    pub fn bind_statement(&mut self, statement: &Stmt) -> Rc<BoundStatement> {
        let bound = match statement {
            Stmt::Block { statements, .. } => {
                self.push_scope();
                let statements = statements
                    .iter()
                    .map(|statement| self.bind_statement(statement))
                    .collect();
                self.pop_scope();
                BoundStatement::Block { statements }
            }
            Stmt::VariableDeclaration {
                keyword,
                identifier,
                type_clause,
                initializer,
                ..
            } => {
                let read_only = keyword.token_type == TokenType::Let;
                let declared_type = type_clause
                    .as_ref()
                    .and_then(|clause| self.bind_type_clause(clause));
                let initializer = match declared_type {
                    Some(ty) => self.bind_expression_as(initializer, ty),
                    None => self.bind_value_expression(initializer),
                };
                let ty = declared_type.unwrap_or_else(|| initializer.ty());
                let variable = self.bind_variable(identifier, read_only, ty);

                BoundStatement::VariableDeclaration {
                    variable,
                    initializer,
                }
            }
            Stmt::If {
                condition,
                then_statement,
                else_clause,
                ..
            } => {
                let condition = self.bind_expression_as(condition, TypeSymbol::Bool);
                let then_statement = self.bind_statement(then_statement);
                let else_statement = else_clause
                    .as_ref()
                    .map(|else_clause| self.bind_statement(&else_clause.statement));

                BoundStatement::If {
                    condition,
                    then_statement,
                    else_statement,
                }
            }
            Stmt::While { condition, body, .. } => {
                let condition = self.bind_expression_as(condition, TypeSymbol::Bool);
                let body = self.bind_statement(body);
                BoundStatement::While { condition, body }
            }
            Stmt::For {
                for_keyword,
                identifier,
                lower_bound,
                upper_bound,
                body,
                ..
            } => {
                let span = TextSpan::from_bounds(for_keyword.span.start, upper_bound.span().end());
                let lower_bound = self.bind_expression_as(lower_bound, TypeSymbol::Number);
                let upper_bound = self.bind_expression_as(upper_bound, TypeSymbol::Number);

                self.push_scope();
                let variable = self.bind_variable(identifier, true, TypeSymbol::Number);
                let body = self.bind_statement(body);
                self.pop_scope();

                BoundStatement::For {
                    variable,
                    lower_bound,
                    upper_bound,
                    body,
                    span,
                }
            }
            Stmt::Expression { expression } => BoundStatement::Expression {
                expression: self.bind_expression(expression),
            },
        };

        Rc::new(bound)
    }

    fn bind_type_clause(&mut self, clause: &TypeClause) -> Option<TypeSymbol> {
        let identifier = &clause.identifier;
        let ty = TypeSymbol::lookup(&identifier.text);
        if ty.is_none() && !identifier.is_missing() {
            self.diagnostics
                .report_undefined_type(identifier.span, &identifier.text);
        }
        ty
    }

    fn variable_kind(&self) -> VariableKind {
        if self.depth == 0 {
            VariableKind::Global
        } else {
            VariableKind::Local
        }
    }

    fn bind_variable(&mut self, identifier: &Token, read_only: bool, ty: TypeSymbol) -> VariableSymbol {
        let name = if identifier.is_missing() {
            "?"
        } else {
            identifier.text.as_str()
        };
        let variable = VariableSymbol::new(name, self.variable_kind(), read_only, ty);

        if !identifier.is_missing() && !self.scope.try_declare(variable.clone()) {
            self.diagnostics
                .report_variable_already_declared(identifier.span, name);
        }

        variable
    }

    // Expressions

    /// Binds an expression that must produce a value of type `ty`, allowing
    /// only implicit conversions.
    fn bind_expression_as(&mut self, expression: &Expr, ty: TypeSymbol) -> Rc<BoundExpression> {
        let bound = self.bind_value_expression(expression);
        self.bind_conversion(expression.span(), bound, ty, false)
    }

    /// Binds an expression used as a value; `void` is reported here.
    fn bind_value_expression(&mut self, expression: &Expr) -> Rc<BoundExpression> {
        let bound = self.bind_expression(expression);
        if bound.ty() == TypeSymbol::Void {
            self.diagnostics
                .report_expression_must_have_value(expression.span());
            return Rc::new(BoundExpression::Error);
        }
        bound
    }

    pub fn bind_expression(&mut self, expression: &Expr) -> Rc<BoundExpression> {
        match expression {
            Expr::Literal { value, .. } => Rc::new(BoundExpression::Literal {
                value: value.clone(),
            }),
            Expr::Parenthesized { expression, .. } => self.bind_expression(expression),
            Expr::Name { identifier } => self.bind_name_expression(identifier),
            Expr::Assignment {
                identifier,
                equals,
                expression,
            } => self.bind_assignment_expression(identifier, equals, expression),
            Expr::Unary { operator, operand } => {
                self.bind_unary_expression(expression.span(), operator, operand)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => self.bind_binary_expression(expression.span(), left, operator, right),
            Expr::Call {
                identifier,
                arguments,
                ..
            } => self.bind_call_expression(expression.span(), identifier, arguments),
        }
    }

    fn bind_name_expression(&mut self, identifier: &Token) -> Rc<BoundExpression> {
        // The parser already reported the missing token
        if identifier.is_missing() {
            return Rc::new(BoundExpression::Error);
        }

        match self.scope.try_lookup(&identifier.text) {
            Some(variable) => Rc::new(BoundExpression::Variable {
                variable,
                span: identifier.span,
            }),
            None => {
                self.diagnostics
                    .report_undefined_variable(identifier.span, &identifier.text);
                Rc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_assignment_expression(&mut self, identifier: &Token, equals: &Token, expression: &Expr) -> Rc<BoundExpression> {
        let existing = self.scope.try_lookup(&identifier.text);
        if let Some(variable) = &existing {
            if variable.is_read_only() {
                self.diagnostics
                    .report_cannot_assign(equals.span, variable.name());
            }
        }

        let bound = self.bind_value_expression(expression);
        let variable = match existing {
            Some(variable) => variable,
            None => {
                // Assigning to an unknown name declares it in the current scope
                let variable = VariableSymbol::new(
                    identifier.text.as_str(),
                    self.variable_kind(),
                    false,
                    bound.ty(),
                );
                self.scope.try_declare(variable.clone());
                return Rc::new(BoundExpression::Assignment {
                    variable,
                    expression: bound,
                });
            }
        };

        let converted = self.bind_conversion(expression.span(), bound, variable.ty(), false);
        Rc::new(BoundExpression::Assignment {
            variable,
            expression: converted,
        })
    }

    fn bind_unary_expression(&mut self, span: TextSpan, operator: &Token, operand: &Expr) -> Rc<BoundExpression> {
        let operand = self.bind_value_expression(operand);
        let operand_type = operand.ty();
        if operand_type == TypeSymbol::Error {
            return Rc::new(BoundExpression::Error);
        }

        match BoundUnaryOperator::bind(operator.token_type, operand_type) {
            Some(operator) => Rc::new(BoundExpression::Unary {
                operator,
                operand,
                span,
            }),
            None => {
                self.diagnostics.report_undefined_unary_operator(
                    operator.span,
                    &operator.text,
                    operand_type,
                );
                Rc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_binary_expression(&mut self, span: TextSpan, left: &Expr, operator: &Token, right: &Expr) -> Rc<BoundExpression> {
        let left = self.bind_value_expression(left);
        let right = self.bind_value_expression(right);
        let (left_type, right_type) = (left.ty(), right.ty());
        if left_type == TypeSymbol::Error || right_type == TypeSymbol::Error {
            return Rc::new(BoundExpression::Error);
        }

        match BoundBinaryOperator::bind(operator.token_type, left_type, right_type) {
            Some(operator) => Rc::new(BoundExpression::Binary {
                left,
                operator,
                right,
                span,
            }),
            None => {
                self.diagnostics.report_undefined_binary_operator(
                    operator.span,
                    &operator.text,
                    left_type,
                    right_type,
                );
                Rc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_call_expression(&mut self, span: TextSpan, identifier: &Token, arguments: &[Expr]) -> Rc<BoundExpression> {
        // `string(x)` and friends are conversions, not calls
        if arguments.len() == 1 {
            if let Some(ty) = TypeSymbol::lookup(&identifier.text) {
                let argument = self.bind_value_expression(&arguments[0]);
                return self.bind_conversion(arguments[0].span(), argument, ty, true);
            }
        }

        let function = BuiltinFunction::lookup(&identifier.text);
        if function.is_none() {
            self.diagnostics
                .report_undefined_function(identifier.span, &identifier.text);
        }

        // Arguments are bound either way so their own errors still show up
        let bound_arguments: Vec<Rc<BoundExpression>> = arguments
            .iter()
            .map(|argument| self.bind_value_expression(argument))
            .collect();

        let Some(function) = function else {
            return Rc::new(BoundExpression::Error);
        };

        let parameters = function.parameters();
        if bound_arguments.len() != parameters.len() {
            self.diagnostics.report_wrong_argument_count(
                span,
                function.name(),
                parameters.len(),
                bound_arguments.len(),
            );
            return Rc::new(BoundExpression::Error);
        }

        let mut has_errors = false;
        for ((argument, syntax), parameter) in bound_arguments.iter().zip(arguments).zip(parameters) {
            let ty = argument.ty();
            if ty == TypeSymbol::Error {
                has_errors = true;
            } else if ty != parameter.ty {
                self.diagnostics
                    .report_wrong_argument_type(syntax.span(), parameter.name, parameter.ty, ty);
                has_errors = true;
            }
        }

        if has_errors {
            return Rc::new(BoundExpression::Error);
        }

        Rc::new(BoundExpression::Call {
            function,
            arguments: bound_arguments,
        })
    }

    fn bind_conversion(
        &mut self,
        span: TextSpan,
        expression: Rc<BoundExpression>,
        ty: TypeSymbol,
        allow_explicit: bool,
    ) -> Rc<BoundExpression> {
        let from = expression.ty();
        if from == TypeSymbol::Error || ty == TypeSymbol::Error {
            return Rc::new(BoundExpression::Error);
        }

        match Conversion::classify(from, ty) {
            Conversion::Identity => expression,
            Conversion::Explicit if !allow_explicit => {
                self.diagnostics
                    .report_cannot_convert_implicitly(span, from, ty);
                Rc::new(BoundExpression::Error)
            }
            Conversion::Implicit | Conversion::Explicit => {
                Rc::new(BoundExpression::Conversion { ty, expression })
            }
            Conversion::Invalid => {
                self.diagnostics.report_cannot_convert(span, from, ty);
                Rc::new(BoundExpression::Error)
            }
        }
    }
}
