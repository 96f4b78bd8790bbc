use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;

const MAX_RANGE: u32 = 0xFFFF;

struct Patterns {
    bfchar_section: Regex,
    bfrange_section: Regex,
    bfchar: Regex,
    bfrange: Regex,
    array_item: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        bfchar_section: Regex::new(r"(?s)beginbfchar(.*?)endbfchar").expect("bfchar section"),
        bfrange_section: Regex::new(r"(?s)beginbfrange(.*?)endbfrange").expect("bfrange section"),
        bfchar: Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]*)>").expect("bfchar pair"),
        bfrange: Regex::new(
            r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*(?:<([0-9A-Fa-f]*)>|\[([^\]]*)\])",
        )
        .expect("bfrange triple"),
        array_item: Regex::new(r"<([0-9A-Fa-f]*)>").expect("array item"),
    })
}

/// Character code to text lookup built from a font's ToUnicode CMap.
#[derive(Debug, Default)]
pub struct UnicodeMap {
    codes: HashMap<u32, String>,
    code_width: usize,
}

impl UnicodeMap {
    pub fn len(&self) -> usize {
        self.codes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
    pub fn get(&self, code: u32) -> Option<&str> {
        self.codes.get(&code).map(String::as_str)
    }
    /// Decodes a string operand. Codes without a mapping are dropped.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let width = self.code_width.max(1);
        bytes
            .chunks(width)
            .filter_map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
                self.codes.get(&code)
            })
            .map(String::as_str)
            .collect()
    }
    fn insert(&mut self, code_hex: &str, code: u32, text: String) {
        self.code_width = self.code_width.max(code_hex.len().div_ceil(2));
        self.codes.insert(code, text);
    }
}

/// Parses the `bfchar` and `bfrange` sections of a ToUnicode CMap stream.
pub fn build_unicode_map(source: &[u8]) -> Option<UnicodeMap> {
    let source = String::from_utf8_lossy(source);
    let p = patterns();
    let mut map = UnicodeMap::default();

    for section in p.bfchar_section.captures_iter(&source) {
        for pair in p.bfchar.captures_iter(&section[1]) {
            if let Some(code) = hex_value(&pair[1]) {
                map.insert(&pair[1], code, utf16_text(&hex_units(&pair[2])));
            }
        }
    }

    for section in p.bfrange_section.captures_iter(&source) {
        for triple in p.bfrange.captures_iter(&section[1]) {
            let (Some(start), Some(end)) = (hex_value(&triple[1]), hex_value(&triple[2])) else {
                continue;
            };
            if end < start || end - start > MAX_RANGE {
                continue;
            }
            if let Some(destination) = triple.get(3) {
                let units = hex_units(destination.as_str());
                for (offset, code) in (start..=end).enumerate() {
                    map.insert(&triple[1], code, utf16_text(&shift_last(&units, offset)));
                }
            } else if let Some(array) = triple.get(4) {
                for (item, code) in p.array_item.captures_iter(array.as_str()).zip(start..=end) {
                    map.insert(&triple[1], code, utf16_text(&hex_units(&item[1])));
                }
            }
        }
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn hex_value(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16).ok()
}

fn hex_units(hex: &str) -> Vec<u16> {
    hex.as_bytes()
        .chunks(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|chunk| u16::from_str_radix(chunk, 16).ok())
        .collect()
}

fn shift_last(units: &[u16], offset: usize) -> Vec<u16> {
    let mut units = units.to_vec();
    if let Some(last) = units.last_mut() {
        *last = last.wrapping_add(offset as u16);
    }
    units
}

fn utf16_text(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}
