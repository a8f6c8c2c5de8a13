//! UTF-8 decode and UAX #31 identifier/whitespace/digit classification.
//!
//! Grounded in `examples/original_source/src/unicode/yaep_unicode.h`: the
//! original wraps `utf8proc` with an ASCII fast path and a handful of
//! predicates tailored to a grammar-description lexer. The idiomatic Rust
//! equivalent of "wrap a UCD library instead of hand-rolling the tables" is
//! `unicode-ident` (the crate `syn`/`proc-macro2` already use for this exact
//! purpose) plus `unicode-normalization` for NFC. Per spec.md S1, this is
//! the full extent of the Unicode subsystem's scope: classification for
//! tokenizing a grammar description. Normalization beyond NFC and any
//! truncation behavior belongs to the grammar front-end, not here.

use unicode_normalization::UnicodeNormalization;

/// Returns true if `cp` can start an identifier: UAX #31 `XID_Start`, widened
/// with `_` as radlr's own grammar lexer and most C-family grammars do.
pub fn is_identifier_start(cp: char) -> bool {
  cp == '_' || unicode_ident::is_xid_start(cp)
}

/// Returns true if `cp` can continue an identifier: UAX #31 `XID_Continue`.
/// This already includes combining marks (Mn, Mc) and connector punctuation
/// (Pc), which spec.md S4.3 calls out explicitly.
pub fn is_identifier_continue(cp: char) -> bool {
  unicode_ident::is_xid_continue(cp)
}

/// Returns true if `cp` is a decimal digit (general category Nd).
pub fn is_decimal_digit(cp: char) -> bool {
  cp.is_ascii_digit() || (!cp.is_ascii() && digit_value(cp).is_some())
}

/// Returns true if `cp` is Unicode whitespace, matching YAEP's
/// `yaep_utf8_isspace` (Zs/Zl/Zp plus the ASCII control whitespace chars).
pub fn is_whitespace(cp: char) -> bool {
  cp.is_whitespace()
}

/// Decimal value (0-9) of a Unicode digit, and the code point of that
/// script's zero digit (`cp - value`), mirroring
/// `yaep_utf8_digit_value`'s `block_start` output. The block start is what
/// lets the lexer reject a numeral that mixes digits from two scripts
/// (spec.md S4.3: "mixed-script numeric literals are rejected").
pub fn digit_value(cp: char) -> Option<(u32, char)> {
  if cp.is_ascii_digit() {
    return Some((cp as u32 - '0' as u32, '0'));
  }
  let value = cp.to_digit(10)?;
  let block_start = char::from_u32(cp as u32 - value)?;
  Some((value, block_start))
}

/// Normalizes an identifier to NFC before it is interned, per spec.md
/// S4.3 ("Identifier bytes are canonicalized to NFC at symbol ingestion").
pub fn normalize_identifier(name: &str) -> String {
  name.nfc().collect()
}

/// Validates that `bytes` is well-formed UTF-8, returning the byte offset of
/// the first invalid sequence on failure. This is the "pre-flight UTF-8
/// validation" of spec.md S4.3: it must not consume any lexer/grammar state,
/// so it is a pure function over bytes.
pub fn validate_utf8(bytes: &[u8]) -> Result<&str, usize> {
  std::str::from_utf8(bytes).map_err(|e| e.valid_up_to())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ascii_identifier_classes() {
    assert!(is_identifier_start('a'));
    assert!(is_identifier_start('_'));
    assert!(!is_identifier_start('1'));
    assert!(is_identifier_continue('1'));
  }

  #[test]
  fn non_ascii_identifiers() {
    assert!(is_identifier_start('π'));
    assert!(is_identifier_continue('\u{0301}')); // combining acute accent (Mn)
  }

  #[test]
  fn digit_values_and_blocks() {
    assert_eq!(digit_value('7'), Some((7, '0')));
    // U+0667 ARABIC-INDIC DIGIT SEVEN
    assert_eq!(digit_value('\u{0667}'), Some((7, '\u{0660}')));
  }

  #[test]
  fn invalid_utf8_reports_offset() {
    let bytes = b"abc\xC3";
    assert_eq!(validate_utf8(bytes), Err(3));
  }

  #[test]
  fn nfc_collapses_canonical_equivalents() {
    let decomposed = "e\u{0301}"; // e + combining acute
    let composed = "\u{00e9}"; // é
    assert_eq!(normalize_identifier(decomposed), normalize_identifier(composed));
  }
}
