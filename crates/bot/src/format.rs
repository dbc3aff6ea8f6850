//! Chat message rendering (Telegram legacy Markdown).

use regex::RegexBuilder;

use amap_core::{BasketDay, BasketSnapshot, Contract};

pub const HELP: &str = "🤖 *Bot AMAP*\n\n\
    🔹 /panier : Affiche les produits à récupérer ce vendredi.\n\
    🔹 /contrats : Liste les Contrats ouverts.\n\
    🔹 /chercher [mot] : Cherche quand un produit sera distribué.\n\
    🔹 /aide : Affiche l'aide.";

pub const BASKET_LOADING: &str = "🔄 Récupération du panier...";
pub const BASKET_NOT_FOUND: &str = "ℹ️ Aucun panier trouvé.";
pub const CONTRACTS_LOADING: &str = "📂 Chargement des contrats...";
pub const NO_CONTRACTS: &str = "ℹ️ Aucun contrat ouvert.";
pub const SEARCH_USAGE: &str = "ℹ️ Ex: `/chercher miel`";

/// Products to collect on one distribution date.
pub fn basket(day: &BasketDay) -> String {
    if day.products.is_empty() {
        return format!("Aucun produit à récupérer le *{}*.", day.label);
    }

    let lines: Vec<String> = day.products.iter().map(|p| format!("• {p}")).collect();
    format!("Voici les produits à récupérer pour la distribution du *{}* :\n\n{}", day.label, lines.join("\n"))
}

/// The open contracts list.
pub fn contracts(contracts: &[Contract]) -> String {
    let mut text = String::from("📝 *Contrats ouverts* :\n\n");
    for c in contracts {
        text.push_str(&format!("🔹 *{}*\n   _{}_\n   [Lien]({})\n\n", c.title, c.deadline, c.url));
    }
    text
}

/// Notification for one new or updated contract.
pub fn contract_change(contract: &Contract) -> String {
    format!(
        "🆕 *Nouveau contrat (ou mise à jour) !*\n\n📜 *{}*\n⏳ _{}_\n👉 [Voir le contrat]({})",
        contract.title, contract.deadline, contract.url
    )
}

/// Products whose text contains `query`, case-insensitively, grouped by date
/// in snapshot order.
pub fn find_products<'a>(snapshot: &'a BasketSnapshot, query: &str) -> Vec<(&'a str, Vec<&'a str>)> {
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query)).case_insensitive(true).build() else {
        return Vec::new();
    };

    snapshot
        .iter()
        .filter_map(|day| {
            let matches: Vec<&str> = day
                .products
                .iter()
                .map(String::as_str)
                .filter(|p| pattern.is_match(p))
                .collect();
            (!matches.is_empty()).then_some((day.label.as_str(), matches))
        })
        .collect()
}

/// Search answer: the dates where `query` shows up, or a "not found" line.
pub fn search(snapshot: &BasketSnapshot, query: &str) -> String {
    let found = find_products(snapshot, query);
    if found.is_empty() {
        return format!("🤷‍♂️ Pas de '{query}' trouvé.");
    }

    let blocks: Vec<String> = found
        .iter()
        .map(|(label, products)| {
            let lines: Vec<String> = products.iter().map(|p| format!("  └ {p}")).collect();
            format!("📅 *{}*\n{}", label, lines.join("\n"))
        })
        .collect();
    format!("✅ Trouvé :\n\n{}", blocks.join("\n\n"))
}
