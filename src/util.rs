//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Braces that don't match a provided key are left untouched, so JSON examples
/// inside a template survive rendering.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings (char-boundary aware).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_known_keys_only() {
    let out = fill_template("{\"n\": {count}} about {topic} {other}", &[("count", "3"), ("topic", "Rust")]);
    assert_eq!(out, "{\"n\": 3} about Rust {other}");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    let s = "héllo wörld";
    let t = trunc_for_log(s, 2);
    assert!(t.starts_with('h'));
    assert!(t.contains("bytes total"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
