//! Paragraph layout: line breaking and justification.
//!
//! `layout_block` places the spans of a `TextBlock` into lines. Breaks
//! happen at whitespace and at explicit newlines; a word wider than the
//! block stays on its own line. Glyph measurement is abstracted behind
//! `TextMetrics` so layout does not depend on a font backend.

use crate::core::config::points_to_pixels;
use crate::deck::{Justification, Style};

use super::layout::{Span, TextBlock};

/// Font measurements needed by the line breaker.
pub trait TextMetrics {
    /// Advance width of `text` set in `style`, in pixels.
    fn advance(&self, style: &Style, text: &str) -> f32;

    /// Distance between baselines of consecutive lines, in pixels.
    fn line_height(&self, style: &Style) -> f32;

    /// Height above the baseline, in pixels.
    fn ascent(&self, style: &Style) -> f32;
}

/// Fixed-pitch estimate used when no font is available.
///
/// Every character is half an em wide; lines are 1.2 em apart.
#[derive(Clone, Copy, Debug)]
pub struct ApproxMetrics {
    pub card_width: u32,
}

impl ApproxMetrics {
    fn em(&self, style: &Style) -> f32 {
        points_to_pixels(style.typesize, self.card_width)
    }
}

impl TextMetrics for ApproxMetrics {
    fn advance(&self, style: &Style, text: &str) -> f32 {
        text.chars().count() as f32 * self.em(style) * 0.5
    }

    fn line_height(&self, style: &Style) -> f32 {
        self.em(style) * 1.2
    }

    fn ascent(&self, style: &Style) -> f32 {
        self.em(style) * 0.9
    }
}

/// What a placed piece draws.
#[derive(Clone, Debug, PartialEq)]
pub enum PieceKind {
    /// A run of text from the text span at `span`.
    Text(String),
    /// The inline image span at `span`.
    Image,
}

/// A piece of a line at its final position.
#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    /// Index into `TextBlock::spans`.
    pub span: usize,
    pub kind: PieceKind,
    /// Left edge, relative to the block.
    pub x: f32,
    pub width: f32,
}

/// One laid-out line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Top of the line, relative to the block.
    pub y: f32,
    pub height: f32,
    /// Baseline offset from `y`.
    pub ascent: f32,
    pub pieces: Vec<Piece>,
}

/// A text block placed into lines.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidOutBlock {
    pub lines: Vec<Line>,
    /// Wrap width, or the widest line when the block does not wrap.
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
enum Atom {
    /// Unbreakable run (possibly mixing spans).
    Word(Vec<Piece>),
    Space { span: usize, width: f32 },
    Break,
}

fn atom_width(atom: &Atom) -> f32 {
    match atom {
        Atom::Word(pieces) => pieces.iter().map(|p| p.width).sum(),
        Atom::Space { width, .. } => *width,
        Atom::Break => 0.0,
    }
}

fn tokenize(block: &TextBlock, metrics: &dyn TextMetrics) -> Vec<Atom> {
    let mut atoms = Vec::new();
    let mut word: Vec<Piece> = Vec::new();

    let flush = |word: &mut Vec<Piece>, atoms: &mut Vec<Atom>| {
        if !word.is_empty() {
            atoms.push(Atom::Word(std::mem::take(word)));
        }
    };

    for (index, span) in block.spans.iter().enumerate() {
        match span {
            Span::Image { size, .. } => word.push(Piece {
                span: index,
                kind: PieceKind::Image,
                x: 0.0,
                width: size.width,
            }),
            Span::Text { text, style } => {
                let mut run = String::new();
                for ch in text.chars() {
                    if ch == '\n' || ch == ' ' || ch == '\t' {
                        if !run.is_empty() {
                            let width = metrics.advance(style, &run);
                            word.push(Piece {
                                span: index,
                                kind: PieceKind::Text(std::mem::take(&mut run)),
                                x: 0.0,
                                width,
                            });
                        }
                        flush(&mut word, &mut atoms);
                        if ch == '\n' {
                            atoms.push(Atom::Break);
                        } else {
                            let width = metrics.advance(style, " ");
                            atoms.push(Atom::Space { span: index, width });
                        }
                    } else {
                        run.push(ch);
                    }
                }
                if !run.is_empty() {
                    let width = metrics.advance(style, &run);
                    word.push(Piece {
                        span: index,
                        kind: PieceKind::Text(run),
                        x: 0.0,
                        width,
                    });
                }
            }
        }
    }
    flush(&mut word, &mut atoms);
    atoms
}

/// Lines of atoms, each flagged when it ends a paragraph.
fn break_lines(atoms: Vec<Atom>, width: Option<f32>) -> Vec<(Vec<Atom>, bool)> {
    let has_word = |line: &[Atom]| line.iter().any(|a| matches!(a, Atom::Word(_)));

    let mut lines = Vec::new();
    let mut line: Vec<Atom> = Vec::new();
    let mut x = 0.0;
    // the current line was started by wrapping, not by a paragraph break
    let mut wrapped = false;

    for atom in atoms {
        match atom {
            Atom::Break => {
                lines.push((std::mem::take(&mut line), true));
                x = 0.0;
                wrapped = false;
            }
            Atom::Space { .. } => {
                if wrapped && !has_word(&line) {
                    continue;
                }
                x += atom_width(&atom);
                line.push(atom);
            }
            Atom::Word(_) => {
                let w = atom_width(&atom);
                if let Some(limit) = width {
                    if has_word(&line) && x + w > limit {
                        lines.push((std::mem::take(&mut line), false));
                        x = 0.0;
                        wrapped = true;
                    }
                }
                x += w;
                line.push(atom);
            }
        }
    }
    lines.push((line, true));

    for (atoms, _) in &mut lines {
        while matches!(atoms.last(), Some(Atom::Space { .. })) {
            atoms.pop();
        }
    }
    lines
}

/// Lay out `block` into lines using `metrics`.
#[must_use]
pub fn layout_block(block: &TextBlock, metrics: &dyn TextMetrics) -> LaidOutBlock {
    let wrap = (block.width > 0.0 && block.width.is_finite()).then_some(block.width);
    let lines = break_lines(tokenize(block, metrics), wrap);

    let content_widths: Vec<f32> = lines
        .iter()
        .map(|(atoms, _)| atoms.iter().map(atom_width).sum())
        .collect();
    let width = wrap.unwrap_or_else(|| content_widths.iter().copied().fold(0.0, f32::max));

    let mut y = 0.0;
    let mut out = Vec::with_capacity(lines.len());
    for ((atoms, ends_paragraph), content) in lines.into_iter().zip(content_widths) {
        let (height, ascent) = line_metrics(block, &atoms, metrics);
        let slack = (width - content).max(0.0);
        let gaps = atoms
            .iter()
            .filter(|a| matches!(a, Atom::Space { .. }))
            .count();
        let (mut x, stretch) = match block.justification {
            Justification::Left => (0.0, 0.0),
            Justification::Right => (slack, 0.0),
            Justification::Center => (slack / 2.0, 0.0),
            Justification::Full if !ends_paragraph && gaps > 0 => (0.0, slack / gaps as f32),
            Justification::Full => (0.0, 0.0),
        };

        let mut pieces = Vec::new();
        for atom in atoms {
            match atom {
                Atom::Word(word) => {
                    for mut piece in word {
                        piece.x = x;
                        x += piece.width;
                        pieces.push(piece);
                    }
                }
                Atom::Space { width, .. } => x += width + stretch,
                Atom::Break => {}
            }
        }
        out.push(Line {
            y,
            height,
            ascent,
            pieces,
        });
        y += height;
    }

    LaidOutBlock {
        lines: out,
        width,
        height: y,
    }
}

fn line_metrics(block: &TextBlock, atoms: &[Atom], metrics: &dyn TextMetrics) -> (f32, f32) {
    let mut height: f32 = 0.0;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    let mut any = false;

    let mut visit = |span: usize| {
        any = true;
        match &block.spans[span] {
            Span::Text { style, .. } => {
                let a = metrics.ascent(style);
                let lh = metrics.line_height(style);
                ascent = ascent.max(a);
                descent = descent.max(lh - a);
                height = height.max(lh);
            }
            Span::Image { size, .. } => {
                ascent = ascent.max(size.height);
                height = height.max(size.height);
            }
        }
    };
    for atom in atoms {
        match atom {
            Atom::Word(pieces) => pieces.iter().for_each(|p| visit(p.span)),
            Atom::Space { span, .. } => visit(*span),
            Atom::Break => {}
        }
    }

    if !any {
        let style = &block.base_style;
        return (metrics.line_height(style), metrics.ascent(style));
    }
    (height.max(ascent + descent), ascent)
}
