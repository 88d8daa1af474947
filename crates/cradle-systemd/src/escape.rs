//! Escaping of command tokens for unit-file `Exec*=` lines.

/// Escapes a single command token for inclusion in a unit-file command line.
///
/// `$` and `%` are doubled so systemd does not treat them as variable or
/// specifier references. Tokens containing whitespace, double quotes, or
/// backslashes are wrapped in double quotes with embedded `"` and `\`
/// escaped. Tokens with no special characters pass through unchanged.
///
/// Must be applied exactly once per token; double-escaping is a defect.
#[must_use]
pub fn escape_arg(arg: &str) -> String {
    let arg = arg.replace('$', "$$").replace('%', "%%");
    if !arg
        .chars()
        .any(|c| c.is_whitespace() || c == '"' || c == '\\')
    {
        return arg;
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Escapes every token of a command line.
#[must_use]
pub fn escape_args(args: &[String]) -> Vec<String> {
    args.iter().map(|arg| escape_arg(arg)).collect()
}
