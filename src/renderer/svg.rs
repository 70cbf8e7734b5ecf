//! SVG documents for a table and for a shot animation

use std::fmt::Write;

use crate::consts::*;
use crate::sim::{Ball, Cushion, Table, TableObject};

/// Fill colour per ball number
pub const BALL_COLOURS: [&str; 16] = [
    "WHITE",
    "YELLOW",
    "BLUE",
    "RED",
    "PURPLE",
    "ORANGE",
    "GREEN",
    "BROWN",
    "BLACK",
    "LIGHTYELLOW",
    "LIGHTBLUE",
    "PINK",
    "MEDIUMPURPLE",
    "LIGHTSALMON",
    "LIGHTGREEN",
    "SANDYBROWN",
];

const FELT: &str = "#C0D0C0";
const CUSHION: &str = "darkgreen";
/// Cushion rail thickness outside the playing surface
const RAIL: i64 = 25;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg width="700" height="1375" viewBox="-25 -25 1400 2750" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
"#;
const FOOTER: &str = "</svg>\n";

/// One table snapshot as a standalone document.
///
/// With `cue_id` set, the cue ball carries `id="cue"` so a front end can
/// attach aiming to it.
pub fn table_svg(table: &Table, cue_id: bool) -> String {
    let mut out = String::from(HEADER);
    felt(&mut out);
    for object in table.iter() {
        match object {
            TableObject::Ball(ball) => ball_svg(&mut out, ball, cue_id),
            TableObject::Cushion(cushion) => cushion_svg(&mut out, cushion),
            TableObject::Hole(hole) => hole_svg(&mut out, hole.pos.x, hole.pos.y),
        }
    }
    out.push_str(FOOTER);
    out
}

/// Every frame of a shot in one document.
///
/// The fixtures are drawn once from the first frame, then each frame's balls
/// go into a `<g id="frame-{i}">` group. Only the last frame tags the cue.
pub fn animation_svg(frames: &[Table]) -> String {
    let mut out = String::from(HEADER);
    felt(&mut out);
    let fixtures = frames.first().cloned().unwrap_or_default();
    for object in fixtures.iter() {
        match object {
            TableObject::Cushion(cushion) => cushion_svg(&mut out, cushion),
            TableObject::Hole(hole) => hole_svg(&mut out, hole.pos.x, hole.pos.y),
            TableObject::Ball(_) => {}
        }
    }

    let last = frames.len().saturating_sub(1);
    for (i, frame) in frames.iter().enumerate() {
        let _ = writeln!(out, "<g id=\"{}\">", frame_id(i));
        for ball in frame.balls() {
            ball_svg(&mut out, ball, i == last);
        }
        out.push_str("</g>\n");
    }
    out.push_str(FOOTER);
    out
}

/// Element id of animation frame `i`
pub fn frame_id(i: usize) -> String {
    format!("frame-{i}")
}

fn felt(out: &mut String) {
    let _ = writeln!(
        out,
        r#"  <rect width="{}" height="{}" x="0" y="0" fill="{FELT}" />"#,
        TABLE_WIDTH as i64, TABLE_LENGTH as i64
    );
}

fn ball_svg(out: &mut String, ball: &Ball, cue_id: bool) {
    let id = if cue_id && ball.number == CUE_NUMBER { r#"id="cue" "# } else { "" };
    let colour = BALL_COLOURS
        .get(usize::from(ball.number))
        .copied()
        .unwrap_or("GREY");
    let _ = writeln!(
        out,
        r#"  <circle {id}cx="{}" cy="{}" r="{}" fill="{colour}" />"#,
        ball.pos.x as i64, ball.pos.y as i64, BALL_RADIUS as i64
    );
}

fn hole_svg(out: &mut String, x: f64, y: f64) {
    let _ = writeln!(
        out,
        r#"  <circle cx="{}" cy="{}" r="{}" fill="black" />"#,
        x as i64, y as i64, HOLE_RADIUS as i64
    );
}

/// Rails sit outside the felt: the near cushions are shifted back by the rail width
fn cushion_svg(out: &mut String, cushion: &Cushion) {
    match *cushion {
        Cushion::Horizontal { y } => {
            let y = if y == 0.0 { -RAIL } else { y as i64 };
            let _ = writeln!(
                out,
                r#"  <rect width="{}" height="{RAIL}" x="{}" y="{y}" fill="{CUSHION}" />"#,
                TABLE_WIDTH as i64 + 2 * RAIL,
                -RAIL
            );
        }
        Cushion::Vertical { x } => {
            let x = if x == 0.0 { -RAIL } else { x as i64 };
            let _ = writeln!(
                out,
                r#"  <rect width="{RAIL}" height="{}" x="{x}" y="{}" fill="{CUSHION}" />"#,
                TABLE_LENGTH as i64 + 2 * RAIL,
                -RAIL
            );
        }
    }
}
