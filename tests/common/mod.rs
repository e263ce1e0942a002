//! Shared test fixtures: a tiny TrueType font writer.
//!
//! Builds fonts with just the tables the fingerprinting needs: `cmap`
//! (format 12), `glyf`/`loca`, `head`, `hhea`, `maxp` and a `name` table
//! carrying the PostScript name. Glyph 0 is always empty.

#![allow(dead_code)]

/// One glyph: contours of `(x, y, on_curve)` points plus an optional
/// Unicode codepoint.
#[derive(Debug, Clone)]
pub struct TestGlyph {
    pub contours: Vec<Vec<(i16, i16, bool)>>,
    pub codepoint: Option<u32>,
}

impl TestGlyph {
    pub fn new(contours: Vec<Vec<(i16, i16, bool)>>, codepoint: char) -> Self {
        Self {
            contours,
            codepoint: Some(codepoint as u32),
        }
    }

    /// Same glyph with every coordinate multiplied by `factor` and shifted.
    pub fn transformed(&self, factor: i16, dx: i16, dy: i16) -> Self {
        Self {
            contours: self
                .contours
                .iter()
                .map(|c| {
                    c.iter()
                        .map(|&(x, y, on)| (x * factor + dx, y * factor + dy, on))
                        .collect()
                })
                .collect(),
            codepoint: self.codepoint,
        }
    }
}

/// Square contour, all points on-curve.
pub fn square(x: i16, y: i16, size: i16) -> Vec<(i16, i16, bool)> {
    vec![
        (x, y, true),
        (x + size, y, true),
        (x + size, y + size, true),
        (x, y + size, true),
    ]
}

/// Rounded contour alternating on- and off-curve points.
pub fn bowl(x: i16, y: i16, size: i16) -> Vec<(i16, i16, bool)> {
    vec![
        (x, y + size / 2, true),
        (x, y, false),
        (x + size / 2, y, true),
        (x + size, y, false),
        (x + size, y + size / 2, true),
        (x + size, y + size, false),
        (x + size / 2, y + size, true),
        (x, y + size, false),
    ]
}

/// Triangle contour.
pub fn triangle(x: i16, y: i16, size: i16) -> Vec<(i16, i16, bool)> {
    vec![(x, y, true), (x + size, y, true), (x + size / 2, y + size, true)]
}

/// The four distinct glyphs used across the integration tests.
pub fn glyph_a() -> TestGlyph {
    TestGlyph::new(vec![square(100, 0, 400)], 'a')
}

pub fn glyph_b() -> TestGlyph {
    TestGlyph::new(vec![bowl(50, 0, 500)], 'b')
}

pub fn glyph_c() -> TestGlyph {
    TestGlyph::new(vec![triangle(0, 0, 600), square(250, 100, 100)], 'c')
}

pub fn glyph_d() -> TestGlyph {
    TestGlyph::new(vec![triangle(0, 600, 300)], 'd')
}

/// Font under construction.
#[derive(Debug, Clone)]
pub struct TestFont {
    postscript_name: Option<String>,
    units_per_em: u16,
    glyphs: Vec<TestGlyph>,
    outlines: bool,
    undecodable_name_first: bool,
}

impl TestFont {
    pub fn new(postscript_name: Option<&str>, units_per_em: u16) -> Self {
        Self {
            postscript_name: postscript_name.map(str::to_string),
            units_per_em,
            glyphs: Vec::new(),
            outlines: true,
            undecodable_name_first: false,
        }
    }

    pub fn glyph(mut self, glyph: TestGlyph) -> Self {
        self.glyphs.push(glyph);
        self
    }

    /// Leave out `glyf`/`loca`, like a font with CFF outlines.
    pub fn without_outlines(mut self) -> Self {
        self.outlines = false;
        self
    }

    /// Put a PostScript name record in a Mac Japanese encoding before the
    /// Windows one.
    pub fn with_undecodable_name_first(mut self) -> Self {
        self.undecodable_name_first = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16 + 1;
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"cmap", self.cmap()),
            (*b"head", self.head()),
            (*b"hhea", hhea()),
            (*b"maxp", maxp(num_glyphs)),
        ];
        if self.outlines {
            let (glyf, loca) = self.glyf_loca();
            tables.push((*b"glyf", glyf));
            tables.push((*b"loca", loca));
        }
        if let Some(name) = &self.postscript_name {
            tables.push((*b"name", name_table(name, self.undecodable_name_first)));
        }
        tables.sort_by(|a, b| a.0.cmp(&b.0));
        assemble(&tables)
    }

    fn head(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(54);
        put_u32(&mut out, 0x0001_0000); // version
        put_u32(&mut out, 0x0001_0000); // fontRevision
        put_u32(&mut out, 0); // checkSumAdjustment
        put_u32(&mut out, 0x5F0F_3CF5); // magicNumber
        put_u16(&mut out, 0); // flags
        put_u16(&mut out, self.units_per_em);
        out.extend_from_slice(&[0; 16]); // created, modified
        out.extend_from_slice(&[0; 8]); // bbox
        put_u16(&mut out, 0); // macStyle
        put_u16(&mut out, 8); // lowestRecPPEM
        put_u16(&mut out, 2); // fontDirectionHint
        put_u16(&mut out, 1); // indexToLocFormat: long
        put_u16(&mut out, 0); // glyphDataFormat
        out
    }

    fn cmap(&self) -> Vec<u8> {
        let mut groups: Vec<(u32, u32)> = self
            .glyphs
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.codepoint.map(|cp| (cp, i as u32 + 1)))
            .collect();
        groups.sort();

        let mut out = Vec::new();
        put_u16(&mut out, 0); // version
        put_u16(&mut out, 1); // numTables
        put_u16(&mut out, 3); // platform: Windows
        put_u16(&mut out, 10); // encoding: UCS-4
        put_u32(&mut out, 12); // subtable offset
        put_u16(&mut out, 12); // format
        put_u16(&mut out, 0); // reserved
        put_u32(&mut out, 16 + 12 * groups.len() as u32);
        put_u32(&mut out, 0); // language
        put_u32(&mut out, groups.len() as u32);
        for (cp, gid) in groups {
            put_u32(&mut out, cp);
            put_u32(&mut out, cp);
            put_u32(&mut out, gid);
        }
        out
    }

    fn glyf_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        put_u32(&mut loca, 0);
        // Glyph 0 is empty: offsets 0 and 0.
        put_u32(&mut loca, 0);
        for glyph in &self.glyphs {
            glyf.extend(simple_glyph(&glyph.contours));
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
            put_u32(&mut loca, glyf.len() as u32);
        }
        (glyf, loca)
    }
}

fn simple_glyph(contours: &[Vec<(i16, i16, bool)>]) -> Vec<u8> {
    let mut out = Vec::new();
    if contours.is_empty() {
        return out;
    }
    let points: Vec<(i16, i16, bool)> = contours.iter().flatten().copied().collect();
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0);

    put_i16(&mut out, contours.len() as i16);
    put_i16(&mut out, x_min);
    put_i16(&mut out, y_min);
    put_i16(&mut out, x_max);
    put_i16(&mut out, y_max);
    let mut end = 0u16;
    for contour in contours {
        end += contour.len() as u16;
        put_u16(&mut out, end - 1);
    }
    put_u16(&mut out, 0); // instructionLength

    // Flags without short/same bits: every delta is a full i16.
    for &(_, _, on) in &points {
        out.push(u8::from(on));
    }
    let mut prev = 0i16;
    for &(x, _, _) in &points {
        put_i16(&mut out, x - prev);
        prev = x;
    }
    prev = 0;
    for &(_, y, _) in &points {
        put_i16(&mut out, y - prev);
        prev = y;
    }
    out
}

fn hhea() -> Vec<u8> {
    let mut out = Vec::with_capacity(36);
    put_u32(&mut out, 0x0001_0000); // version
    put_i16(&mut out, 800); // ascender
    put_i16(&mut out, -200); // descender
    put_i16(&mut out, 0); // lineGap
    put_u16(&mut out, 1000); // advanceWidthMax
    out.extend_from_slice(&[0; 22]); // extents, caret, reserved, metricDataFormat
    put_u16(&mut out, 1); // numberOfHMetrics
    out
}

fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(6);
    put_u32(&mut out, 0x0000_5000);
    put_u16(&mut out, num_glyphs);
    out
}

fn name_table(postscript_name: &str, undecodable_first: bool) -> Vec<u8> {
    let encoded: Vec<u8> = postscript_name
        .encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect();
    let junk = [0x82, 0xA0, 0x82, 0xA2];
    let count: u16 = if undecodable_first { 2 } else { 1 };

    let mut out = Vec::new();
    put_u16(&mut out, 0); // format
    put_u16(&mut out, count);
    put_u16(&mut out, 6 + 12 * count); // stringOffset
    if undecodable_first {
        put_u16(&mut out, 1); // platform: Macintosh
        put_u16(&mut out, 1); // encoding: Japanese
        put_u16(&mut out, 11); // language: Japanese
        put_u16(&mut out, 6); // nameID: PostScript name
        put_u16(&mut out, junk.len() as u16);
        put_u16(&mut out, encoded.len() as u16); // offset, after the UTF-16 string
    }
    put_u16(&mut out, 3); // platform: Windows
    put_u16(&mut out, 1); // encoding: Unicode BMP
    put_u16(&mut out, 0x0409); // language: en-US
    put_u16(&mut out, 6); // nameID: PostScript name
    put_u16(&mut out, encoded.len() as u16);
    put_u16(&mut out, 0); // offset
    out.extend(encoded);
    if undecodable_first {
        out.extend_from_slice(&junk);
    }
    out
}

fn assemble(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let mut out = Vec::new();
    put_u32(&mut out, 0x0001_0000);
    put_u16(&mut out, num_tables);
    put_u16(&mut out, 0); // searchRange
    put_u16(&mut out, 0); // entrySelector
    put_u16(&mut out, 0); // rangeShift

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in tables {
        out.extend_from_slice(tag);
        put_u32(&mut out, 0); // checksum
        put_u32(&mut out, (offset + body.len()) as u32);
        put_u32(&mut out, data.len() as u32);
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
    }
    offset += body.len();
    out.extend(body);
    debug_assert_eq!(out.len(), offset);
    out
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
