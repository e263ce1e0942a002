//! Raw `glyf` point decoding.
//!
//! Fingerprints are taken over the points exactly as the font stores them.
//! The drawing callbacks of `ttf-parser` repeat the first point of each
//! contour and insert implied on-curve midpoints, so this module reads
//! `loca`/`glyf` itself. Composite glyphs are flattened: component points
//! are transformed, moved into place and appended in component order.

use bitflags::bitflags;
use nom::{
    IResult,
    bytes::complete::take,
    combinator::map,
    multi::count,
    number::complete::{be_i8, be_i16, be_u8, be_u16, be_u32},
    sequence::{pair, preceded, tuple},
};

use crate::error::{Error, Result};
use crate::fonts::outline::OutlinePoint;

/// Composite nesting deeper than this is treated as a broken font.
const MAX_COMPONENT_DEPTH: usize = 32;

/// Offset of `indexToLocFormat` in the `head` table.
const INDEX_TO_LOC_FORMAT_OFFSET: usize = 50;

bitflags! {
    /// Flags of one simple-glyph point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct PointFlags: u8 {
        const ON_CURVE = 0x01;
        const X_SHORT = 0x02;
        const Y_SHORT = 0x04;
        const REPEAT = 0x08;
        const X_SAME_OR_POSITIVE = 0x10;
        const Y_SAME_OR_POSITIVE = 0x20;
    }
}

bitflags! {
    /// Flags of one composite-glyph component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ComponentFlags: u16 {
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        const ARGS_ARE_XY_VALUES = 0x0002;
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        const SCALED_COMPONENT_OFFSET = 0x0800;
    }
}

/// Points of one glyph with the index of the last point of each contour.
#[derive(Debug, Clone, Default, PartialEq)]
struct GlyphPoints {
    points: Vec<OutlinePoint>,
    end_points: Vec<usize>,
}

impl GlyphPoints {
    /// Apply a 2x2 matrix `[xx, xy, yx, yy]`: `x' = x*xx + y*yx`,
    /// `y' = x*xy + y*yy`.
    fn transform(&mut self, m: [f32; 4]) {
        if m == IDENTITY {
            return;
        }
        for p in &mut self.points {
            let (x, y) = (p.x, p.y);
            p.x = x * m[0] + y * m[2];
            p.y = x * m[1] + y * m[3];
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    fn append(&mut self, other: GlyphPoints) {
        let base = self.points.len();
        self.end_points
            .extend(other.end_points.into_iter().map(|end| end + base));
        self.points.extend(other.points);
    }

    fn into_contours(self) -> Vec<Vec<OutlinePoint>> {
        let mut contours = Vec::with_capacity(self.end_points.len());
        let mut start = 0;
        for end in self.end_points {
            contours.push(self.points[start..=end].to_vec());
            start = end + 1;
        }
        contours
    }
}

const IDENTITY: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy)]
struct Component {
    glyph_id: u16,
    flags: ComponentFlags,
    arg1: i32,
    arg2: i32,
    transform: [f32; 4],
}

/// The `glyf` table with its `loca` offsets resolved.
#[derive(Debug, Clone)]
pub(crate) struct GlyfTable<'a> {
    glyf: &'a [u8],
    offsets: Vec<u32>,
}

impl<'a> GlyfTable<'a> {
    /// Resolve `loca` for `num_glyphs` glyphs using the format from `head`.
    pub(crate) fn parse(head: &[u8], loca: &[u8], glyf: &'a [u8], num_glyphs: u16) -> Result<Self> {
        let entries = usize::from(num_glyphs) + 1;
        let (_, format) = preceded(take(INDEX_TO_LOC_FORMAT_OFFSET), be_i16)(head)
            .map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
                Error::FontParse("'head' table too short".to_string())
            })?;

        let parsed: IResult<&[u8], Vec<u32>> = match format {
            0 => count(map(be_u16, |v| u32::from(v) * 2), entries)(loca),
            1 => count(be_u32, entries)(loca),
            other => {
                return Err(Error::FontParse(format!(
                    "unknown indexToLocFormat {}",
                    other
                )));
            },
        };
        let (_, offsets) = parsed.map_err(|_| {
            Error::FontParse(format!("'loca' table has fewer than {} entries", entries))
        })?;

        Ok(Self { glyf, offsets })
    }

    /// Contours of one glyph, composites flattened.
    pub(crate) fn contours(&self, glyph_id: u16) -> Result<Vec<Vec<OutlinePoint>>> {
        Ok(self.points(glyph_id, 0)?.into_contours())
    }

    fn glyph_data(&self, glyph_id: u16) -> Result<&'a [u8]> {
        let index = usize::from(glyph_id);
        let (Some(&start), Some(&end)) = (self.offsets.get(index), self.offsets.get(index + 1))
        else {
            return Err(Error::FontParse(format!("glyph {} is not in 'loca'", glyph_id)));
        };
        let (start, end) = (start as usize, end as usize);
        if start > end || end > self.glyf.len() {
            return Err(Error::FontParse(format!(
                "glyph {} has an invalid 'glyf' range {}..{}",
                glyph_id, start, end
            )));
        }
        Ok(&self.glyf[start..end])
    }

    fn points(&self, glyph_id: u16, depth: usize) -> Result<GlyphPoints> {
        if depth > MAX_COMPONENT_DEPTH {
            return Err(Error::FontParse(format!(
                "composite glyph {} nests too deep",
                glyph_id
            )));
        }

        let data = self.glyph_data(glyph_id)?;
        if data.is_empty() {
            return Ok(GlyphPoints::default());
        }

        let malformed = |_: nom::Err<nom::error::Error<&[u8]>>| {
            Error::FontParse(format!("glyph {} is malformed", glyph_id))
        };
        let (body, contour_count) = glyph_header(data).map_err(malformed)?;
        if contour_count >= 0 {
            let (_, points) = simple_glyph(body, contour_count as usize).map_err(malformed)?;
            return Ok(points);
        }

        let (_, components) = components(body).map_err(malformed)?;
        let mut out = GlyphPoints::default();
        for component in components {
            let mut child = self.points(component.glyph_id, depth + 1)?;
            let (dx, dy) = if component.flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES) {
                let (dx, dy) = (component.arg1 as f32, component.arg2 as f32);
                if component.flags.contains(ComponentFlags::SCALED_COMPONENT_OFFSET) {
                    child.translate(dx, dy);
                    child.transform(component.transform);
                    out.append(child);
                    continue;
                }
                child.transform(component.transform);
                (dx, dy)
            } else {
                child.transform(component.transform);
                let parent = out.points.get(component.arg1 as usize);
                let anchor = child.points.get(component.arg2 as usize);
                let (Some(parent), Some(anchor)) = (parent, anchor) else {
                    return Err(Error::FontParse(format!(
                        "glyph {} matches component points out of range",
                        glyph_id
                    )));
                };
                (parent.x - anchor.x, parent.y - anchor.y)
            };
            child.translate(dx, dy);
            out.append(child);
        }
        Ok(out)
    }
}

/// Contour count; the bounding box is skipped.
fn glyph_header(input: &[u8]) -> IResult<&[u8], i16> {
    let (input, contour_count) = be_i16(input)?;
    let (input, _) = take(8usize)(input)?;
    Ok((input, contour_count))
}

fn simple_glyph(input: &[u8], contour_count: usize) -> IResult<&[u8], GlyphPoints> {
    let (input, ends) = count(be_u16, contour_count)(input)?;
    if ends.windows(2).any(|w| w[0] >= w[1]) {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (input, instruction_len) = be_u16(input)?;
    let (input, _) = take(instruction_len)(input)?;

    let point_count = ends.last().map_or(0, |&end| usize::from(end) + 1);
    let (input, flags) = point_flags(input, point_count)?;
    let (input, xs) = coordinates(
        input,
        &flags,
        PointFlags::X_SHORT,
        PointFlags::X_SAME_OR_POSITIVE,
    )?;
    let (input, ys) = coordinates(
        input,
        &flags,
        PointFlags::Y_SHORT,
        PointFlags::Y_SAME_OR_POSITIVE,
    )?;

    let points = flags
        .iter()
        .zip(xs.iter().zip(&ys))
        .map(|(flag, (&x, &y))| OutlinePoint {
            x: x as f32,
            y: y as f32,
            on_curve: flag.contains(PointFlags::ON_CURVE),
        })
        .collect();
    let end_points = ends.into_iter().map(usize::from).collect();
    Ok((input, GlyphPoints { points, end_points }))
}

fn point_flags(mut input: &[u8], point_count: usize) -> IResult<&[u8], Vec<PointFlags>> {
    let mut flags = Vec::with_capacity(point_count);
    while flags.len() < point_count {
        let (rest, byte) = be_u8(input)?;
        let flag = PointFlags::from_bits_truncate(byte);
        let (rest, repeat) = if flag.contains(PointFlags::REPEAT) {
            be_u8(rest)?
        } else {
            (rest, 0)
        };
        for _ in 0..=repeat {
            flags.push(flag);
        }
        input = rest;
    }
    flags.truncate(point_count);
    Ok((input, flags))
}

fn coordinates<'i>(
    mut input: &'i [u8],
    flags: &[PointFlags],
    short: PointFlags,
    same_or_positive: PointFlags,
) -> IResult<&'i [u8], Vec<i32>> {
    let mut value = 0i32;
    let mut out = Vec::with_capacity(flags.len());
    for flag in flags {
        let delta = if flag.contains(short) {
            let (rest, d) = be_u8(input)?;
            input = rest;
            if flag.contains(same_or_positive) {
                i32::from(d)
            } else {
                -i32::from(d)
            }
        } else if flag.contains(same_or_positive) {
            0
        } else {
            let (rest, d) = be_i16(input)?;
            input = rest;
            i32::from(d)
        };
        value += delta;
        out.push(value);
    }
    Ok((input, out))
}

fn f2dot14(input: &[u8]) -> IResult<&[u8], f32> {
    map(be_i16, |v| f32::from(v) / 16384.0)(input)
}

fn component(input: &[u8]) -> IResult<&[u8], Component> {
    let (input, flags) = map(be_u16, ComponentFlags::from_bits_truncate)(input)?;
    let (input, glyph_id) = be_u16(input)?;

    let words = flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS);
    let signed = flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES);
    let (input, (arg1, arg2)) = match (words, signed) {
        (true, true) => map(pair(be_i16, be_i16), |(a, b)| (i32::from(a), i32::from(b)))(input)?,
        (true, false) => map(pair(be_u16, be_u16), |(a, b)| (i32::from(a), i32::from(b)))(input)?,
        (false, true) => map(pair(be_i8, be_i8), |(a, b)| (i32::from(a), i32::from(b)))(input)?,
        (false, false) => map(pair(be_u8, be_u8), |(a, b)| (i32::from(a), i32::from(b)))(input)?,
    };

    let (input, transform) = if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
        map(f2dot14, |s| [s, 0.0, 0.0, s])(input)?
    } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
        map(pair(f2dot14, f2dot14), |(sx, sy)| [sx, 0.0, 0.0, sy])(input)?
    } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
        map(tuple((f2dot14, f2dot14, f2dot14, f2dot14)), |(xx, xy, yx, yy)| {
            [xx, xy, yx, yy]
        })(input)?
    } else {
        (input, IDENTITY)
    };

    Ok((
        input,
        Component {
            glyph_id,
            flags,
            arg1,
            arg2,
            transform,
        },
    ))
}

fn components(mut input: &[u8]) -> IResult<&[u8], Vec<Component>> {
    let mut out = Vec::new();
    loop {
        let (rest, next) = component(input)?;
        input = rest;
        out.push(next);
        if !next.flags.contains(ComponentFlags::MORE_COMPONENTS) {
            return Ok((input, out));
        }
    }
}
