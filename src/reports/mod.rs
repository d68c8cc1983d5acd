use chordforge::core_types::{pitch_name, Individual, Mode, Note};
use chordforge::keys::KeyConstraintTable;
use chordforge::optimizer::Logbook;
use chordforge::render::RenderedAccompaniment;
use chordforge::scorer::FitnessBreakdown;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::path::PathBuf;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, cols: std::ops::RangeInclusive<usize>) {
    for i in cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn format_registers(registers: &[i8]) -> String {
    registers
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rendered archive entries with the files they were written to.
pub fn print_archive(entries: &[(RenderedAccompaniment, PathBuf)]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Fitness").fg(Color::Cyan),
        Cell::new("Registers"),
        Cell::new("File"),
    ]);
    align_right(&mut table, 1..=1);

    for (r, path) in entries {
        let fitness = r
            .fitness
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(r.rank).add_attribute(Attribute::Bold),
            Cell::new(fitness).fg(Color::Cyan),
            Cell::new(format_registers(&r.registers)),
            Cell::new(path.display()),
        ]);
    }
    println!("\n{}", table);
}

/// Slot-by-slot view of one individual next to its per-term score.
pub fn print_fitness_breakdown(individual: &Individual, d: &FitnessBreakdown) {
    let mut slots = new_table();
    slots.add_row(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Start"),
        Cell::new("Notes"),
        Cell::new("Type"),
        Cell::new("Label"),
    ]);
    align_right(&mut slots, 1..=1);

    for (i, chord) in individual.chords().iter().enumerate() {
        let label = d
            .labels
            .get(i)
            .cloned()
            .flatten()
            .unwrap_or_else(|| "?".to_string());
        slots.add_row(vec![
            Cell::new(i),
            Cell::new(format!("{:.2}", chord.start())),
            Cell::new(chord.display_pitches()),
            Cell::new(chord.kind()),
            Cell::new(label),
        ]);
    }
    println!("\n{}", slots);

    let mut terms = new_table();
    terms.add_row(vec![
        Cell::new("Term").add_attribute(Attribute::Bold),
        Cell::new("Score"),
        Cell::new("Detail"),
    ]);
    align_right(&mut terms, 1..=1);

    let rows: [(&str, f32, String, Color); 6] = [
        (
            "Voicing",
            d.voicing,
            format!(
                "{} wide gaps, {} unison chords",
                d.spacing_violations, d.unison_chords
            ),
            Color::Red,
        ),
        (
            "Doubling",
            d.doubling,
            format!("{}/{} slots", d.doubled_slots, d.slots),
            Color::Green,
        ),
        (
            "Bass",
            d.bass,
            format!("{}/{} slots an octave below", d.bass_octave_slots, d.slots),
            Color::Reset,
        ),
        (
            "Harmony",
            d.harmony,
            format!("{}/{} slots in key", d.in_key_slots, d.slots),
            Color::Reset,
        ),
        (
            "Register",
            d.register,
            format!("{} octaves used", d.registers_used),
            Color::Red,
        ),
        (
            "Cadence",
            d.cadence,
            if d.cadence_closed { "closed" } else { "open" }.to_string(),
            Color::Green,
        ),
    ];
    for (name, value, detail, color) in rows {
        terms.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.2}", value)).fg(color),
            Cell::new(detail),
        ]);
    }
    terms.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", d.total))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    println!("{}", terms);
}

/// Diatonic chord vocabulary of every supported key in `mode`.
pub fn print_key_table(mode: Mode) {
    let mut table = new_table();
    let numerals = match mode {
        Mode::Major => ["I", "ii", "iii", "IV", "V", "vi", "vii°"],
        Mode::Minor => ["i", "ii°", "III", "iv", "v", "VI", "VII"],
    };
    let mut header = vec![Cell::new(format!("Key ({})", mode)).add_attribute(Attribute::Bold)];
    header.extend(numerals.iter().map(Cell::new));
    table.add_row(header);

    for (tonic, labels) in KeyConstraintTable::rows(mode) {
        let mut row = vec![Cell::new(tonic).add_attribute(Attribute::Bold)];
        row.extend(labels.iter().map(Cell::new));
        table.add_row(row);
    }
    println!("\n{}", table);
}

/// Summary of the run as recorded in the logbook.
pub fn print_final_stats(log: &Logbook) {
    let Some(first) = log.records.first() else {
        return;
    };
    let Some(last) = log.last() else {
        return;
    };

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Generation").add_attribute(Attribute::Bold),
        Cell::new("Evals"),
        Cell::new("Mean"),
        Cell::new("Std"),
        Cell::new("Min"),
        Cell::new("Max").fg(Color::Cyan),
    ]);
    align_right(&mut table, 0..=5);

    for s in [first, last] {
        table.add_row(vec![
            Cell::new(s.generation),
            Cell::new(s.evaluations),
            Cell::new(format!("{:.2}", s.mean)),
            Cell::new(format!("{:.2}", s.std)),
            Cell::new(format!("{:.2}", s.min)),
            Cell::new(format!("{:.2}", s.max)).fg(Color::Cyan),
        ]);
    }
    println!("\n{}", table);
    println!(
        "   {} generations, {} evaluations",
        log.len().saturating_sub(1),
        log.total_evaluations()
    );
}

pub fn print_melody_summary(notes: &[Note]) {
    let line = notes
        .iter()
        .map(|n| pitch_name(n.pitch))
        .collect::<Vec<_>>()
        .join(" ");
    println!("🎵 Melody ({} notes): {}", notes.len(), line);
}
