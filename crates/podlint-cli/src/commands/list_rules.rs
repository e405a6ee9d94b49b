//! List rules command implementation.

use podlint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<20} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<10} {:<20} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  podlint check --rules long-line");
    println!("  podlint check --rules PL001,PL002");
}
