// SPDX-License-Identifier: Apache-2.0

//! Loads an ASCII (`aag`) or binary (`aig`) AIGER file into an [`Aig`].
//!
//! The two variants are distinguished by the first header token. The
//! parser is intentionally strict — it fails fast on any structural
//! inconsistency, with the offending line number where one exists, so the
//! engine can rely on strong invariants in the resulting graph.

use std::fs;
use std::path::Path;

use crate::aig::{lit_from_var, Aig, AigParts};
use crate::error::{MapError, Result};

/// Parses an AIGER file from disk.
pub fn load_aiger_from_path(path: &Path) -> Result<Aig> {
    let contents = fs::read(path)
        .map_err(|e| MapError::InputMalformed(format!("failed to read {}: {}", path.display(), e)))?;
    let aig = load_aiger(&contents)?;
    log::info!(
        "loaded {}: M={} I={} L={} O={} A={}",
        path.display(),
        aig.max_var(),
        aig.num_inputs(),
        aig.num_latches(),
        aig.num_outputs(),
        aig.num_ands()
    );
    Ok(aig)
}

/// Parses AIGER bytes, dispatching on the `aag`/`aig` magic.
pub fn load_aiger(src: &[u8]) -> Result<Aig> {
    let mut cursor = 0usize;
    let mut line_no = 0u32;

    let header = read_line(src, &mut cursor, &mut line_no)?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() != 6 {
        return Err(MapError::InputMalformed(format!(
            "expected 6 tokens in the AIGER header, got {} (\"{}\")",
            tokens.len(),
            header
        )));
    }
    let binary = match tokens[0] {
        "aag" => false,
        "aig" => true,
        other => {
            return Err(MapError::InputMalformed(format!(
                "unknown AIGER magic '{}' (expected 'aag' or 'aig')",
                other
            )));
        }
    };
    let max_var = parse_u32(tokens[1], "M", line_no)?;
    let num_inputs = parse_u32(tokens[2], "I", line_no)?;
    let num_latches = parse_u32(tokens[3], "L", line_no)?;
    let num_outputs = parse_u32(tokens[4], "O", line_no)?;
    let num_ands = parse_u32(tokens[5], "A", line_no)?;

    if max_var != num_inputs + num_latches + num_ands {
        return Err(MapError::InputMalformed(format!(
            "invalid checksum: I + L + A = {} but M = {}",
            num_inputs + num_latches + num_ands,
            max_var
        )));
    }
    let max_lit = lit_from_var(max_var) + 1;

    // Inputs are implicit in the binary variant; the ASCII variant lists
    // each positive literal and they must appear in order.
    if !binary {
        for idx in 1..=num_inputs {
            let line = read_line(src, &mut cursor, &mut line_no)?;
            let lit = parse_u32(line, "input literal", line_no)?;
            if lit != lit_from_var(idx) {
                return Err(MapError::InputMalformed(format!(
                    "unexpected input literal {} on line {} (expected {})",
                    lit,
                    line_no,
                    lit_from_var(idx)
                )));
            }
        }
    }

    let mut latches: Vec<(u32, u32)> = Vec::with_capacity(num_latches as usize);
    for idx in 0..num_latches {
        let latch_lit = lit_from_var(num_inputs + 1 + idx);
        let line = read_line(src, &mut cursor, &mut line_no)?;
        let next_q = if binary {
            parse_u32(line, "next-state literal", line_no)?
        } else {
            let toks: Vec<&str> = line.split_whitespace().collect();
            if toks.len() != 2 {
                return Err(MapError::InputMalformed(format!(
                    "latch line should have 2 fields, got \"{}\" on line {}",
                    line, line_no
                )));
            }
            let lit = parse_u32(toks[0], "latch literal", line_no)?;
            if lit != latch_lit {
                return Err(MapError::InputMalformed(format!(
                    "unexpected latch literal {} on line {} (expected {})",
                    lit, line_no, latch_lit
                )));
            }
            parse_u32(toks[1], "next-state literal", line_no)?
        };
        if next_q < 2 {
            return Err(MapError::InputMalformed(format!(
                "latch on line {} is tied to a constant next-state ({})",
                line_no, next_q
            )));
        }
        if next_q > max_lit {
            return Err(MapError::InputMalformed(format!(
                "next-state literal {} on line {} exceeds the maximum literal {}",
                next_q, line_no, max_lit
            )));
        }
        latches.push((latch_lit, next_q));
    }

    let mut outputs: Vec<u32> = Vec::with_capacity(num_outputs as usize);
    for _ in 0..num_outputs {
        let line = read_line(src, &mut cursor, &mut line_no)?;
        let lit = parse_u32(line, "output literal", line_no)?;
        if lit > max_lit {
            return Err(MapError::InputMalformed(format!(
                "output literal {} on line {} exceeds the maximum literal {}",
                lit, line_no, max_lit
            )));
        }
        outputs.push(lit);
    }

    let mut ands: Vec<(u32, u32, u32)> = Vec::with_capacity(num_ands as usize);
    for idx in 0..num_ands {
        let and_lit = lit_from_var(num_inputs + num_latches + 1 + idx);
        let (rhs0, rhs1) = if binary {
            let delta0 = decode_delta(src, &mut cursor)?;
            let delta1 = decode_delta(src, &mut cursor)?;
            let rhs0 = and_lit.checked_sub(delta0).ok_or_else(|| {
                MapError::InputMalformed(format!(
                    "delta {} underflows AND literal {}",
                    delta0, and_lit
                ))
            })?;
            let rhs1 = rhs0.checked_sub(delta1).ok_or_else(|| {
                MapError::InputMalformed(format!(
                    "delta {} underflows child literal {}",
                    delta1, rhs0
                ))
            })?;
            (rhs0, rhs1)
        } else {
            let line = read_line(src, &mut cursor, &mut line_no)?;
            let toks: Vec<&str> = line.split_whitespace().collect();
            if toks.len() != 3 {
                return Err(MapError::InputMalformed(format!(
                    "AND line should have 3 fields, got \"{}\" on line {}",
                    line, line_no
                )));
            }
            let lit = parse_u32(toks[0], "AND literal", line_no)?;
            if lit != and_lit {
                return Err(MapError::InputMalformed(format!(
                    "unexpected AND literal {} on line {} (expected {})",
                    lit, line_no, and_lit
                )));
            }
            (
                parse_u32(toks[1], "child literal", line_no)?,
                parse_u32(toks[2], "child literal", line_no)?,
            )
        };
        if rhs0 < rhs1 || rhs1 < 2 {
            return Err(MapError::InputMalformed(format!(
                "AND literal {} violates rhs0 >= rhs1 >= 2 (rhs0 = {}, rhs1 = {})",
                and_lit, rhs0, rhs1
            )));
        }
        if and_lit <= rhs0 {
            return Err(MapError::InputMalformed(format!(
                "AND literal {} must be greater than its children (rhs0 = {})",
                and_lit, rhs0
            )));
        }
        ands.push((and_lit, rhs0, rhs1));
    }

    // Symbol table and comment block run to end of file. A line whose
    // first character is 'c' starts the comment block; everything after it
    // is captured verbatim.
    let mut input_names: Vec<String> = Vec::new();
    let mut latch_names: Vec<String> = Vec::new();
    let mut output_names: Vec<String> = Vec::new();
    let mut comments: Vec<String> = Vec::new();
    let mut in_comments = false;
    while cursor < src.len() {
        let line = read_line(src, &mut cursor, &mut line_no)?;
        if in_comments {
            comments.push(line.to_string());
            continue;
        }
        if line.starts_with('c') {
            in_comments = true;
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let (kind, rest) = line.split_at(1);
        let names = match kind {
            "i" => &mut input_names,
            "l" => &mut latch_names,
            "o" => &mut output_names,
            _ => continue,
        };
        let (idx_str, name) = rest.split_once(' ').ok_or_else(|| {
            MapError::InputMalformed(format!(
                "malformed symbol \"{}\" on line {}: missing name",
                line, line_no
            ))
        })?;
        let idx: usize = idx_str.parse().map_err(|e| {
            MapError::InputMalformed(format!(
                "invalid symbol index in \"{}\" on line {}: {}",
                line, line_no, e
            ))
        })?;
        if idx > names.len() {
            return Err(MapError::InputMalformed(format!(
                "symbol index {} on line {} skips ahead of the {} names bound so far",
                idx,
                line_no,
                names.len()
            )));
        }
        names.push(name.to_string());
    }

    for (names, count, kind) in [
        (&input_names, num_inputs, "input"),
        (&latch_names, num_latches, "latch"),
        (&output_names, num_outputs, "output"),
    ] {
        if !names.is_empty() && names.len() != count as usize {
            return Err(MapError::InputMalformed(format!(
                "incomplete {} symbols: {} declared, {} named",
                kind,
                count,
                names.len()
            )));
        }
    }

    Aig::new(AigParts {
        max_var,
        num_inputs,
        num_latches,
        num_outputs,
        num_ands,
        outputs,
        ands,
        latches,
        input_names,
        latch_names,
        output_names,
        comments,
        binary,
    })
}

fn read_line<'a>(src: &'a [u8], cursor: &mut usize, line_no: &mut u32) -> Result<&'a str> {
    if *cursor >= src.len() {
        return Err(MapError::InputMalformed(format!(
            "unexpected end of file after line {}",
            line_no
        )));
    }
    let rest = &src[*cursor..];
    let len = rest.iter().position(|b| *b == b'\n').unwrap_or(rest.len());
    let line = std::str::from_utf8(&rest[..len]).map_err(|e| {
        MapError::InputMalformed(format!("invalid UTF-8 on line {}: {}", *line_no + 1, e))
    })?;
    *cursor += len + 1;
    *line_no += 1;
    Ok(line)
}

fn parse_u32(s: &str, what: &str, line_no: u32) -> Result<u32> {
    s.trim().parse::<u32>().map_err(|e| {
        MapError::InputMalformed(format!(
            "invalid {} \"{}\" on line {}: {}",
            what,
            s.trim(),
            line_no,
            e
        ))
    })
}

/// Decodes one little-endian 7-bits-at-a-time delta: while the top bit is
/// set, the low 7 bits fill the next 7-bit slot; the first byte with a
/// clear top bit terminates.
fn decode_delta(src: &[u8], cursor: &mut usize) -> Result<u32> {
    let mut shift = 0u32;
    let mut acc = 0u32;
    loop {
        if *cursor >= src.len() {
            return Err(MapError::InputMalformed(
                "unexpected end of file while decoding an AND delta".to_string(),
            ));
        }
        let byte = src[*cursor];
        *cursor += 1;
        acc |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            return Ok(acc);
        }
        shift += 7;
        if shift >= 32 {
            return Err(MapError::InputMalformed(
                "AND delta varint overflows 32 bits".to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_simple_and() {
        let aig = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n").unwrap();
        assert_eq!(aig.max_var(), 3);
        assert_eq!(aig.num_inputs(), 2);
        assert_eq!(aig.num_ands(), 1);
        assert_eq!(aig.outputs(), &[6]);
        let node = aig.and_from_lit(6).unwrap();
        assert_eq!((node.rhs0, node.rhs1), (4, 2));
        assert!(!aig.is_binary_source());
        assert!(aig.is_combinational());
    }

    #[test]
    fn test_binary_matches_ascii() {
        // Same design as above: the single AND 6 4 2 encodes as deltas
        // (6-4, 4-2) = (2, 2).
        let mut bytes = b"aig 3 2 0 1 1\n6\n".to_vec();
        bytes.extend_from_slice(&[0x02, 0x02]);
        let bin = load_aiger(&bytes).unwrap();
        let asc = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n").unwrap();
        assert_eq!(bin.outputs(), asc.outputs());
        assert_eq!(bin.and_nodes(), asc.and_nodes());
        assert!(bin.is_binary_source());
    }

    #[test]
    fn test_binary_latch_lines_carry_only_next_state() {
        // aig 2 0 1 1 1: latch var 1 (literal 2) with next state 4, the
        // AND 4 2 2 encoded as deltas (2, 0), output 4.
        let mut bytes = b"aig 2 0 1 1 1\n4\n4\n".to_vec();
        bytes.extend_from_slice(&[0x02, 0x00]);
        let aig = load_aiger(&bytes).unwrap();
        assert_eq!(aig.num_latches(), 1);
        assert_eq!(aig.latch_from_lit(2).unwrap().next_q, 4);
        let node = aig.and_from_lit(4).unwrap();
        assert_eq!((node.rhs0, node.rhs1), (2, 2));
    }

    #[test]
    fn test_ascii_latch_and_sequential_flag() {
        let aig = load_aiger(b"aag 2 1 1 1 0\n2\n4 2\n4\nl0 state\n").unwrap();
        assert!(aig.is_sequential());
        assert_eq!(aig.latch_nodes().len(), 1);
        assert_eq!(aig.latch_from_lit(4).unwrap().next_q, 2);
        assert_eq!(aig.latch_names(), &["state"]);
        // The latch is an output and its next state references input 2;
        // only the latch carries a counter.
        assert_eq!(aig.fanout_of(4), Some(1));
    }

    #[test]
    fn test_symbols_and_comments() {
        let aig = load_aiger(
            b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\ni0 alpha\ni1 beta\no0 result\nc\nbuilt by hand\n",
        )
        .unwrap();
        assert_eq!(aig.input_names(), &["alpha", "beta"]);
        assert_eq!(aig.output_names(), &["result"]);
        assert_eq!(aig.comments(), &["built by hand"]);
    }

    #[test]
    fn test_symbol_name_keeps_spaces() {
        let aig = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\no0 the result\n").unwrap();
        assert_eq!(aig.output_names(), &["the result"]);
    }

    #[test]
    fn test_incomplete_symbols_rejected() {
        let err = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\ni0 alpha\n").unwrap_err();
        assert!(err.to_string().contains("incomplete input symbols"));
    }

    #[test]
    fn test_symbol_index_out_of_order_rejected() {
        assert!(load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\ni1 beta\n").is_err());
    }

    #[test]
    fn test_bad_magic_rejected() {
        assert!(load_aiger(b"agg 0 0 0 0 0\n").is_err());
    }

    #[test]
    fn test_header_checksum_rejected() {
        assert!(load_aiger(b"aag 4 2 0 1 1\n2\n4\n6\n6 4 2\n").is_err());
    }

    #[test]
    fn test_unexpected_input_literal_rejected() {
        let err = load_aiger(b"aag 3 2 0 1 1\n2\n6\n6\n6 4 2\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_truncated_body_rejected() {
        let err = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n").unwrap_err();
        assert!(err.to_string().contains("end of file"));
    }

    #[test]
    fn test_constant_latch_next_state_rejected() {
        assert!(load_aiger(b"aag 2 1 1 0 0\n2\n4 0\n").is_err());
    }

    #[test]
    fn test_binary_delta_underflow_rejected() {
        // Delta 8 underflows AND literal 6.
        let mut bytes = b"aig 3 2 0 1 1\n6\n".to_vec();
        bytes.extend_from_slice(&[0x08, 0x00]);
        assert!(load_aiger(&bytes).is_err());
    }

    #[test]
    fn test_binary_truncated_delta_rejected() {
        // Continuation bit set with no following byte.
        let mut bytes = b"aig 3 2 0 1 1\n6\n".to_vec();
        bytes.extend_from_slice(&[0x82]);
        assert!(load_aiger(&bytes).is_err());
    }

    #[test]
    fn test_decode_delta_multi_byte() {
        let bytes = [0xac, 0x02];
        let mut cursor = 0;
        assert_eq!(decode_delta(&bytes, &mut cursor).unwrap(), 300);
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_header_roundtrips_through_dump() {
        let aig = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n").unwrap();
        assert!(aig.to_string().contains("M I L O A = 3 2 0 1 1"));
    }
}
