use super::Formatter;

use relmap_core::stmt::Value;

macro_rules! fmt {
    ($f:expr, $( $fragments:expr )*) => {{
        $(
            $fragments.to_sql($f);
        )*
    }};
}

pub(super) trait ToSql {
    fn to_sql(self, f: &mut Formatter<'_>);
}

impl ToSql for &str {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(self);
    }
}

impl ToSql for &String {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(self);
    }
}

impl ToSql for usize {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(&self.to_string());
    }
}

/// A quoted identifier.
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let ident = self.0.as_ref();
        f.dst.push('"');
        f.dst.push_str(&ident.replace('"', "\"\""));
        f.dst.push('"');
    }
}

/// A table alias, `t0`, `t1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Alias(pub(super) usize);

impl ToSql for Alias {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "t" self.0);
    }
}

/// `alias."column"`
pub(super) struct Column<'a>(pub(super) Alias, pub(super) &'a str);

impl ToSql for Column<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, self.0 "." Ident(self.1));
    }
}

/// A bound argument, serialized as a `?` placeholder.
pub(super) struct Arg(pub(super) Value);

impl ToSql for Arg {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if self.0.is_null() {
            f.dst.push_str("NULL");
        } else {
            f.dst.push('?');
            f.args.push(self.0);
        }
    }
}

/// Comma delimited
pub(super) struct Comma<L>(pub(super) L);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, f: &mut Formatter<'_>) {
        let mut s = "";
        for i in self.0 {
            fmt!(f, s i);
            s = ", ";
        }
    }
}
