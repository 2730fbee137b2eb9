use cipherforge::cipher::Key;
use cipherforge::sweep::{preview, CandidatePool, SweepReport};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub fn print_candidate_table(pool: &CandidatePool, top: usize) {
    let ranked = pool.ranked();
    let Some(&(_, best)) = ranked.first() else {
        return;
    };

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("#"),
        Cell::new("Candidate").add_attribute(Attribute::Bold),
        Cell::new("Search"),
        Cell::new("Evals"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Delta"),
        Cell::new("Key"),
        Cell::new("Preview"),
    ]);

    for i in [0, 3, 4, 5] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (rank, (label, c)) in ranked.iter().take(top.max(1)).enumerate() {
        let name_cell = if rank == 0 {
            Cell::new(label)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(label).add_attribute(Attribute::Bold)
        };
        let search = if c.interrupted {
            format!("{}*", c.strategy)
        } else {
            c.strategy.to_string()
        };

        table.add_row(vec![
            Cell::new(rank + 1),
            name_cell,
            Cell::new(search),
            Cell::new(c.evaluations),
            Cell::new(format!("{:.2}", c.score)).fg(Color::Cyan),
            Cell::new(format!("{:.2}", c.score - best.score)),
            Cell::new(c.mode.format_key(&c.key)),
            Cell::new(preview(&c.text, 40)),
        ]);
    }

    println!("\n{}", table);
    if ranked.len() > top {
        println!("    ({} more candidates not shown)", ranked.len() - top);
    }
}

pub fn print_final_report(report: &SweepReport) {
    println!("\n=== 🏆 FINAL RESULT ===");
    println!(
        "Winner: {}{}",
        report.best_label,
        if report.arbitrated {
            " (chosen by arbiter)"
        } else {
            ""
        }
    );
    println!("Score:  {:.2}", report.score);
    println!("Key:    {}", report.mode.format_key(&report.key));
    println!("\n{}", report.decoded_text);
    if let Some(s) = &report.suggestion {
        println!("\nSuggested reading:\n{}", s);
    }
}

/// Cipher alphabet over the plain letters it decodes to.
pub fn print_substitution_key(key: &Key) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let letter =
        |i: usize| Cell::new((b'A' + i as u8) as char).set_alignment(CellAlignment::Center);

    let mut cipher_row = vec![Cell::new("CIPH").add_attribute(Attribute::Bold)];
    cipher_row.extend((0..key.len()).map(letter));
    let mut plain_row = vec![Cell::new("PLAIN").add_attribute(Attribute::Bold)];
    plain_row.extend(key.as_slice().iter().map(|&p| letter(p).fg(Color::Green)));

    table.add_row(cipher_row);
    table.add_row(plain_row);
    println!("\n{}", table);
}
