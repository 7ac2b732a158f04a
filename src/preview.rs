//! One-shot colored terminal preview for the CLI subcommands.

use crossterm::style::{Color as TermColor, Stylize};

use crate::color::Color;
use crate::model::{DiffMark, IslaTurn, Luma};

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

fn label_fg(color: Color) -> TermColor {
    if color.prefers_dark_text() {
        TermColor::Black
    } else {
        TermColor::White
    }
}

/// Print a generated result: swatch rows, tags, and narrative.
pub fn print_luma(luma: &Luma) {
    if !luma.label.is_empty() {
        println!("{}", luma.label.as_str().bold());
        println!();
    }

    let diff = luma.compliance_diff();
    for (i, swatch) in luma.palette.iter().enumerate() {
        let color = swatch.color();
        let block = format!(" {:^12.12} ", swatch.chromakey_label());
        let hex = swatch
            .hex
            .as_deref()
            .unwrap_or("-------")
            .to_string();

        print!(
            "  {}  {}",
            block.with(label_fg(color)).on(term_color(color)),
            hex
        );
        match diff.as_ref().and_then(|marks| marks.get(i)) {
            Some(DiffMark::Changed) => print!("  {}", "changed for compliance".yellow()),
            Some(DiffMark::Unchanged) => print!("  {}", "unchanged".green()),
            None => {}
        }
        println!();

        if !swatch.reason.is_empty() {
            println!("      {}", swatch.reason.as_str().dim());
        }
        if let Some(ada) = &swatch.ada {
            println!(
                "      contrast W {:.2} ({})  B {:.2} ({})  colorblind {}",
                ada.contrast_white,
                ada.grade_white,
                ada.contrast_black,
                ada.grade_black,
                if ada.colorblind_flag { "risk" } else { "safe" }
            );
            if !ada.notes.is_empty() {
                println!("      {}", ada.notes.as_str().dim());
            }
        }
    }

    if !luma.tags.is_empty() {
        println!();
        println!("  {}", luma.tags.join(" · ").as_str().dim());
    }
    if !luma.narrative.is_empty() {
        println!();
        println!("{}", luma.narrative);
    }
}

/// Print one Isla exchange: the reply, its palette metadata, and any
/// suggested colors.
pub fn print_isla(turn: &IslaTurn) {
    println!("{}", turn.reply);

    if let Some(name) = &turn.palette_name {
        println!();
        println!("{} {}", "palette:".dim(), name.as_str().bold());
    }
    if let Some(mood) = &turn.mood {
        println!("{} {}", "mood:".dim(), mood);
    }
    if !turn.ideal_use.is_empty() {
        println!("{} {}", "ideal use:".dim(), turn.ideal_use.join(", "));
    }

    if !turn.colors.is_empty() {
        println!();
        for swatch in &turn.colors {
            let color = swatch.color();
            let block = format!(" {:^12.12} ", swatch.chromakey_label());
            println!(
                "  {}  {}",
                block.with(label_fg(color)).on(term_color(color)),
                swatch.hex.as_deref().unwrap_or("-------")
            );
            if !swatch.reason.is_empty() {
                println!("      {}", swatch.reason.as_str().dim());
            }
        }
    }
}
