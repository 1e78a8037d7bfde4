use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::career::{CareerEvent, EventKind};
use crate::decision::ExitReason;
use crate::ensemble::{Band, EnsembleSummary, SessionBatch};
use crate::session::HandRecord;
use crate::strategy::StrategyOverrides;
use crate::tiers::TierConfig;

pub fn money(v: f64) -> String {
    if v >= 0.0 {
        format!("${:.0}", v)
    } else {
        format!("-${:.0}", -v)
    }
}

pub fn signed_money(v: f64) -> String {
    let s = if v >= 0.0 {
        format!("+{}", money(v))
    } else {
        money(v)
    };
    if v > 0.0 {
        s.green().to_string()
    } else if v < 0.0 {
        s.red().to_string()
    } else {
        s
    }
}

fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

pub fn share_bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 1.0)) * width as f64).round() as usize;
    "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled)
}

pub fn exit_style(exit: ExitReason) -> String {
    let s = exit.as_str();
    match exit {
        ExitReason::StopLoss | ExitReason::Survival => s.red().bold().to_string(),
        ExitReason::ProfitTarget | ExitReason::ColorUp => s.green().bold().to_string(),
        ExitReason::Ratchet | ExitReason::SmartExit => s.yellow().bold().to_string(),
        ExitReason::SessionComplete => s.dimmed().to_string(),
    }
}

pub fn tier_table(tiers: &[TierConfig]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Tier"),
        Cell::new("Bankroll").set_alignment(CellAlignment::Right),
        Cell::new("Unit").set_alignment(CellAlignment::Right),
        Cell::new("Press").set_alignment(CellAlignment::Right),
        Cell::new("Stop").set_alignment(CellAlignment::Right),
        Cell::new("Lock").set_alignment(CellAlignment::Right),
        Cell::new("Max bet").set_alignment(CellAlignment::Right),
    ]);
    for t in tiers {
        let range = if t.max_bankroll == f64::MAX {
            format!("{}+", money(t.min_bankroll))
        } else {
            format!("{} - {}", money(t.min_bankroll), money(t.max_bankroll))
        };
        table.add_row(vec![
            Cell::new(t.level.to_string().bold().to_string()),
            Cell::new(range).set_alignment(CellAlignment::Right),
            Cell::new(money(t.base_unit)).set_alignment(CellAlignment::Right),
            Cell::new(money(t.press_unit)).set_alignment(CellAlignment::Right),
            Cell::new(money(t.stop_loss)).set_alignment(CellAlignment::Right),
            Cell::new(money(t.profit_lock)).set_alignment(CellAlignment::Right),
            Cell::new(money(t.catastrophic_cap)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn strategy_line(o: &StrategyOverrides) -> String {
    let mut parts = vec![
        o.game.to_string(),
        o.target.to_string(),
        o.press_mode.to_string(),
    ];
    if let Some(secondary) = o.secondary {
        parts.push(format!("dual with {}", secondary));
    }
    if o.iron_gate_limit > 0 {
        parts.push(format!("iron gate {}", o.iron_gate_limit));
    }
    if o.ratchet.is_enabled() {
        parts.push(format!("ratchet {:?}", o.ratchet).to_lowercase());
    }
    format!("{}  {}", o.name.bold(), parts.join(" / ").dimmed())
}

pub fn batch_table(batch: &SessionBatch) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Exit"),
        Cell::new("Sessions").set_alignment(CellAlignment::Right),
        Cell::new("Share").set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    for exit in ExitReason::ALL {
        let count = batch.exit_count(exit);
        if count == 0 {
            continue;
        }
        let share = count as f64 / batch.sessions as f64;
        table.add_row(vec![
            Cell::new(exit_style(exit)),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(pct(share)).set_alignment(CellAlignment::Right),
            Cell::new(share_bar(share, 20)),
        ]);
    }

    let mut stats = Table::new();
    stats.set_content_arrangement(ContentArrangement::Dynamic);
    stats.set_header(vec![
        Cell::new("Metric").set_alignment(CellAlignment::Left),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);
    let rows = [
        ("Mean P&L", signed_money(batch.mean_pnl)),
        ("Median P&L", signed_money(batch.median_pnl)),
        ("Win rate", pct(batch.win_rate)),
        ("Mean volume", money(batch.mean_volume)),
        ("Mean hands", format!("{:.1}", batch.mean_hands)),
        ("Edge", pct(batch.edge())),
        ("Worst", signed_money(batch.worst_pnl)),
        ("Best", signed_money(batch.best_pnl)),
    ];
    for (k, v) in rows {
        stats.add_row(vec![
            Cell::new(k.bold().to_string()),
            Cell::new(v).set_alignment(CellAlignment::Right),
        ]);
    }
    format!("{}\n{}", table, stats)
}

pub fn band_table<'a>(bands: impl Iterator<Item = &'a Band>) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("Year")];
    for h in ["Min", "P5", "P25", "Median", "P75", "P95", "Max"] {
        header.push(Cell::new(h).set_alignment(CellAlignment::Right));
    }
    table.set_header(header);
    for b in bands {
        let median = money(b.p50).bold().to_string();
        let mut row = vec![Cell::new(format!("{}", b.month / 12 + 1))];
        for v in [
            money(b.min),
            money(b.p5),
            money(b.p25),
            median,
            money(b.p75),
            money(b.p95),
            money(b.max),
        ] {
            row.push(Cell::new(v).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn summary_table(s: &EnsembleSummary) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric").set_alignment(CellAlignment::Left),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);
    let survival = if s.survival_rate >= 0.9 {
        pct(s.survival_rate).green().to_string()
    } else if s.survival_rate >= 0.6 {
        pct(s.survival_rate).yellow().to_string()
    } else {
        pct(s.survival_rate).red().to_string()
    };
    let milestone = match s.median_milestone_month {
        Some(m) => format!("{} (median month {})", pct(s.milestone_probability), m + 1),
        None => pct(s.milestone_probability),
    };
    let rows = [
        ("Runs", s.runs.to_string()),
        ("Survival", survival),
        ("Mean final", money(s.mean_final_bankroll)),
        ("Median final", money(s.median_final_bankroll)),
        ("Mean tax", money(s.mean_tax_paid)),
        ("Mean contributed", money(s.mean_contributed)),
        ("Insolvent months", format!("{:.1}", s.mean_insolvent_months)),
        ("Milestone", milestone),
    ];
    for (k, v) in rows {
        table.add_row(vec![
            Cell::new(k.bold().to_string()),
            Cell::new(v).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn event_line(e: &CareerEvent) -> String {
    let kind = e.kind.to_string();
    let kind = match e.kind {
        EventKind::Insolvent | EventKind::Tax => kind.red().to_string(),
        EventKind::Promotion | EventKind::Milestone | EventKind::TargetReached => {
            kind.green().bold().to_string()
        }
        EventKind::Contribution | EventKind::Holiday => kind.cyan().to_string(),
    };
    if e.detail.is_empty() {
        format!("  month {:>3}  {}  {}", e.month + 1, kind, money(e.amount))
    } else {
        format!(
            "  month {:>3}  {}  {}  {}",
            e.month + 1,
            kind,
            money(e.amount),
            e.detail.dimmed()
        )
    }
}

pub fn hand_line(h: &HandRecord) -> String {
    let stake = if h.virtual_hand {
        "virtual".dimmed().to_string()
    } else {
        money(h.amount)
    };
    format!(
        "  {:>4}  {:<10} {:>8}  L{}  {:<8} {}",
        h.hand,
        h.target.to_string(),
        stake,
        h.level,
        h.draw.to_string(),
        signed_money(h.pnl)
    )
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
