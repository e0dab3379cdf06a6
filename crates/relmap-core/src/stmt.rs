mod eval;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_call;
pub use expr_call::ExprCall;

mod expr_convert;
pub use expr_convert::ExprConvert;

mod expr_lambda;
pub use expr_lambda::ExprLambda;

mod expr_member;
pub use expr_member::ExprMember;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod expr_param;
pub use expr_param::ExprParam;

pub mod like;

mod load_state;
pub use load_state::LoadState;

mod method;
pub use method::Method;

mod op_binary;
pub use op_binary::BinaryOp;

mod record;
pub use record::Record;

mod sql_statement;
pub use sql_statement::{BuiltStatement, SqlStatement};

mod substitute;
pub use substitute::Env;

mod ty;
pub use ty::{Type, LIST};

mod value;
pub use value::{DateTimeOffset, Value};

pub mod visit;
pub use visit::Visit;

pub mod visit_mut;
pub use visit_mut::VisitMut;
