//! Character-set constructors and queries on top of [`CharSetSolver`].

use std::collections::HashMap;

use log::debug;

use crate::reference::Ref;
use crate::solver::CharSetSolver;
use crate::utils::escape_class_char;

impl CharSetSolver {
    /// The predicate accepting exactly the code `code`.
    pub fn mk_bdd_for_int(&self, code: u32) -> Ref {
        assert!(
            code <= self.max_char(),
            "Code {:#X} does not fit in {} bits",
            code,
            self.bits()
        );

        if let Some(&res) = self.int_cache.borrow().get(&code) {
            return res;
        }

        // Build bottom-up, starting from the least significant bit
        let bits = self.bits();
        let mut res = Ref::ONE;
        for ordinal in (0..bits).rev() {
            let bit = (code >> (bits - 1 - ordinal)) & 1 == 1;
            res = if bit {
                self.mk_node(ordinal, res, Ref::ZERO)
            } else {
                self.mk_node(ordinal, Ref::ZERO, res)
            };
        }

        self.int_cache.borrow_mut().insert(code, res);
        res
    }

    /// Union of the inclusive code ranges in `ranges`, case-sensitive.
    pub fn mk_bdd_for_int_ranges(&self, ranges: &[(u32, u32)]) -> Ref {
        self.mk_or_many(ranges.iter().map(|&(lo, hi)| self.mk_range_constraint(false, lo, hi)))
    }

    /// The predicate for `c`, or for every case variant of `c` when `ignore_case` is set.
    ///
    /// Characters outside the alphabet yield `False`.
    pub fn mk_char_constraint(&self, ignore_case: bool, c: char) -> Ref {
        let code = c as u32;
        if !ignore_case {
            if code > self.max_char() {
                return Ref::ZERO;
            }
            return self.mk_bdd_for_int(code);
        }

        let max = self.max_char();
        self.mk_or_many(
            case_variants(c)
                .into_iter()
                .filter(|&v| v <= max)
                .map(|v| self.mk_bdd_for_int(v)),
        )
    }

    /// Every code in `[lo, hi]`, clamped to the alphabet.
    pub fn mk_range_constraint(&self, ignore_case: bool, lo: u32, hi: u32) -> Ref {
        let max = self.max_char();
        let hi = hi.min(max);
        if lo > hi {
            return Ref::ZERO;
        }

        let base = if self.bits() == 16 && hi - lo > max / 2 {
            // Wide range: build the two flanks and complement
            let mut flanks = Ref::ZERO;
            if lo > 0 {
                flanks = self.mk_interval(0, 0, lo - 1);
            }
            if hi < max {
                flanks = self.mk_or(flanks, self.mk_interval(0, hi + 1, max));
            }
            self.mk_not(flanks)
        } else {
            self.mk_interval(0, lo, hi)
        };

        if !ignore_case || base.is_one() {
            return base;
        }

        let mut variants = Vec::new();
        for code in lo..=hi {
            let Some(c) = char::from_u32(code) else {
                continue;
            };
            for v in case_variants(c) {
                if v <= max && (v < lo || v > hi) {
                    variants.push(v);
                }
            }
        }
        debug!(
            "mk_range_constraint({:#X}, {:#X}) adds {} case variants",
            lo,
            hi,
            variants.len()
        );
        let extra = self.mk_ranges_constraint(false, &merge_codes(variants));
        self.mk_or(base, extra)
    }

    /// Union of [`CharSetSolver::mk_range_constraint`] over `ranges`.
    pub fn mk_ranges_constraint(&self, ignore_case: bool, ranges: &[(u32, u32)]) -> Ref {
        self.mk_or_many(
            ranges
                .iter()
                .map(|&(lo, hi)| self.mk_range_constraint(ignore_case, lo, hi)),
        )
    }

    /// Interval over the bits from `ordinal` downward; `lo` and `hi` are
    /// values of those remaining bits.
    fn mk_interval(&self, ordinal: u32, lo: u32, hi: u32) -> Ref {
        debug_assert!(lo <= hi);

        let width = self.bits() - ordinal;
        if width == 0 {
            return Ref::ONE;
        }
        let full = (1u32 << width) - 1;
        if lo == 0 && hi == full {
            return Ref::ONE;
        }

        let half = 1u32 << (width - 1);
        let (high, low) = if hi < half {
            (Ref::ZERO, self.mk_interval(ordinal + 1, lo, hi))
        } else if lo >= half {
            (self.mk_interval(ordinal + 1, lo - half, hi - half), Ref::ZERO)
        } else {
            (
                self.mk_interval(ordinal + 1, 0, hi - half),
                self.mk_interval(ordinal + 1, lo, half - 1),
            )
        };
        self.mk_node(ordinal, high, low)
    }

    /// Sorted, disjoint, non-adjacent code ranges covered by `f`.
    pub fn to_ranges(&self, f: Ref) -> Vec<(u32, u32)> {
        let mut ranges = Vec::new();
        self.collect_ranges(f, 0, 0, &mut ranges);
        ranges
    }

    fn collect_ranges(&self, f: Ref, ordinal: u32, prefix: u32, out: &mut Vec<(u32, u32)>) {
        if f.is_zero() {
            return;
        }

        let width = self.bits() - ordinal;
        if f.is_one() {
            let lo = prefix << width;
            let hi = lo + ((1u32 << width) - 1);
            match out.last_mut() {
                Some(last) if last.1 + 1 == lo => last.1 = hi,
                _ => out.push((lo, hi)),
            }
            return;
        }

        let node = self.node(f);
        let (high, low) = if node.ordinal == ordinal {
            (node.high, node.low)
        } else {
            // The bit at `ordinal` is free
            (f, f)
        };
        self.collect_ranges(low, ordinal + 1, prefix << 1, out);
        self.collect_ranges(high, ordinal + 1, (prefix << 1) | 1, out);
    }

    /// Number of codes accepted by `f`.
    pub fn count(&self, f: Ref) -> u64 {
        let mut cache = HashMap::new();
        let top = self.ordinal(f).min(self.bits());
        self.count_rec(f, &mut cache) << top
    }

    /// Counts assignments to the bits from `ordinal(f)` downward.
    fn count_rec(&self, f: Ref, cache: &mut HashMap<Ref, u64>) -> u64 {
        if f.is_zero() {
            return 0;
        } else if f.is_one() {
            return 1;
        }

        if let Some(&count) = cache.get(&f) {
            return count;
        }

        let node = self.node(f);
        let bits = self.bits();
        let mut count = 0;
        for child in [node.high, node.low] {
            let skipped = self.ordinal(child).min(bits) - node.ordinal - 1;
            count += self.count_rec(child, cache) << skipped;
        }

        cache.insert(f, count);
        count
    }

    /// Human-readable rendering of a character class.
    ///
    /// ```text
    /// 'a'        -> a
    /// [0-9a-f]   -> [0-9a-f]
    /// everything -> .
    /// nothing    -> []
    /// ```
    pub fn pretty(&self, f: Ref) -> String {
        if f.is_zero() {
            return "[]".to_string();
        }
        if f.is_one() {
            return ".".to_string();
        }

        let ranges = self.to_ranges(f);
        if let [(lo, hi)] = ranges[..] {
            if lo == hi {
                return escape_class_char(lo);
            }
        }

        let complement = self.to_ranges(self.mk_not(f));
        if complement.len() < ranges.len() {
            format!("[^{}]", render_ranges(&complement))
        } else {
            format!("[{}]", render_ranges(&ranges))
        }
    }
}

fn render_ranges(ranges: &[(u32, u32)]) -> String {
    let mut res = String::new();
    for &(lo, hi) in ranges {
        res.push_str(&escape_class_char(lo));
        if hi > lo {
            if hi > lo + 1 {
                res.push('-');
            }
            res.push_str(&escape_class_char(hi));
        }
    }
    res
}

/// Codes of `c` and its single-character lower/upper case mappings.
pub(crate) fn case_variants(c: char) -> Vec<u32> {
    let mut res = vec![c as u32];
    let mut lower = c.to_lowercase();
    if let (Some(l), None) = (lower.next(), lower.next()) {
        res.push(l as u32);
    }
    let mut upper = c.to_uppercase();
    if let (Some(u), None) = (upper.next(), upper.next()) {
        res.push(u as u32);
    }
    res.sort_unstable();
    res.dedup();
    res
}

/// Merge a bag of codes into sorted, disjoint ranges.
fn merge_codes(mut codes: Vec<u32>) -> Vec<(u32, u32)> {
    codes.sort_unstable();
    codes.dedup();
    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for code in codes {
        match ranges.last_mut() {
            Some(last) if last.1 + 1 == code => last.1 = code,
            _ => ranges.push((code, code)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::Encoding;

    #[test]
    fn test_bdd_for_int() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let a = solver.mk_bdd_for_int('a' as u32);
        assert_eq!(solver.count(a), 1);
        assert!(solver.contains(a, 'a' as u32));
        assert!(!solver.contains(a, 'b' as u32));
        // Exactly one node per bit
        assert_eq!(solver.size(a), 7);
        assert_eq!(solver.mk_bdd_for_int('a' as u32), a);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_bdd_for_int_too_wide() {
        let solver = CharSetSolver::new(Encoding::Latin1);
        solver.mk_bdd_for_int(0x100);
    }

    #[test]
    fn test_range_constraint() {
        let solver = CharSetSolver::new(Encoding::Latin1);
        let r = solver.mk_range_constraint(false, 0x30, 0x39);
        assert_eq!(solver.count(r), 10);
        assert_eq!(solver.to_ranges(r), vec![(0x30, 0x39)]);

        let full = solver.mk_range_constraint(false, 0, 0xFF);
        assert_eq!(full, solver.one());

        let single = solver.mk_range_constraint(false, 0x41, 0x41);
        assert_eq!(single, solver.mk_bdd_for_int(0x41));
    }

    #[test]
    fn test_range_clamped() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let r = solver.mk_range_constraint(false, 0x70, 0x1000);
        assert_eq!(solver.to_ranges(r), vec![(0x70, 0x7F)]);
        assert_eq!(solver.mk_range_constraint(false, 0x80, 0x90), solver.zero());
        assert_eq!(solver.mk_range_constraint(false, 0x50, 0x40), solver.zero());
    }

    #[test]
    fn test_wide_utf16_range() {
        let solver = CharSetSolver::new(Encoding::Utf16);
        let wide = solver.mk_range_constraint(false, 0x10, 0xFFF0);
        assert_eq!(solver.to_ranges(wide), vec![(0x10, 0xFFF0)]);
        assert_eq!(solver.count(wide), 0xFFF0 - 0x10 + 1);

        let narrow_union = solver.mk_or(
            solver.mk_range_constraint(false, 0x10, 0x8000),
            solver.mk_range_constraint(false, 0x8001, 0xFFF0),
        );
        assert_eq!(wide, narrow_union);
    }

    #[test]
    fn test_char_ignore_case() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let a = solver.mk_char_constraint(true, 'a');
        assert_eq!(solver.to_ranges(a), vec![('A' as u32, 'A' as u32), ('a' as u32, 'a' as u32)]);

        let digit = solver.mk_char_constraint(true, '5');
        assert_eq!(digit, solver.mk_char_constraint(false, '5'));

        // Out-of-alphabet variants are dropped
        let solver = CharSetSolver::new(Encoding::Ascii);
        assert_eq!(solver.count(solver.mk_char_constraint(true, 'é')), 0);
    }

    #[test]
    fn test_range_ignore_case() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let r = solver.mk_range_constraint(true, 'a' as u32, 'c' as u32);
        assert_eq!(
            solver.to_ranges(r),
            vec![('A' as u32, 'C' as u32), ('a' as u32, 'c' as u32)]
        );
    }

    #[test]
    fn test_ranges_constraint() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let hex = solver.mk_ranges_constraint(false, &[(0x30, 0x39), (0x61, 0x66), (0x41, 0x46)]);
        assert_eq!(solver.count(hex), 22);
        assert_eq!(solver.to_ranges(hex), vec![(0x30, 0x39), (0x41, 0x46), (0x61, 0x66)]);
        assert_eq!(hex, solver.mk_bdd_for_int_ranges(&[(0x30, 0x39), (0x41, 0x46), (0x61, 0x66)]));
    }

    #[test]
    fn test_count_with_skipped_bits() {
        let solver = CharSetSolver::new(Encoding::Latin1);
        // Every odd code
        let odd = solver.mk_node(7, Ref::ONE, Ref::ZERO);
        assert_eq!(solver.count(odd), 128);
        assert_eq!(solver.to_ranges(odd).len(), 128);
        assert_eq!(solver.count(solver.one()), 256);
        assert_eq!(solver.count(solver.zero()), 0);
    }

    #[test]
    fn test_pretty() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        assert_eq!(solver.pretty(solver.mk_char_constraint(false, 'x')), "x");
        assert_eq!(solver.pretty(solver.mk_range_constraint(false, '0' as u32, '9' as u32)), "[0-9]");
        let not_nl = solver.mk_not(solver.mk_char_constraint(false, '\n'));
        assert_eq!(solver.pretty(not_nl), "[^\\n]");
        let ab = solver.mk_range_constraint(false, 'a' as u32, 'b' as u32);
        assert_eq!(solver.pretty(ab), "[ab]");
        assert_eq!(solver.pretty(solver.zero()), "[]");
        assert_eq!(solver.pretty(solver.one()), ".");
    }

    #[test]
    fn test_case_variants() {
        assert_eq!(case_variants('k'), vec!['K' as u32, 'k' as u32]);
        assert_eq!(case_variants('1'), vec!['1' as u32]);
        // 'ß' uppercases to two characters
        assert_eq!(case_variants('ß'), vec!['ß' as u32]);
    }
}
