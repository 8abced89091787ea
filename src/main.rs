use std::env;
use std::io::{self, BufRead, Write};

use anyhow::Result;
use log::info;

use candycost::cost_aggregation::{format_amount, format_unit_price};
use candycost::localization::{detect_language, t_args_lang, t_lang};
use candycost::measurement_units::Unit;
use candycost::product_catalog::{CatalogAccessor, HttpCatalog, InMemoryCatalog};
use candycost::selection_ledger::RowId;
use candycost::session::{ActionOutcome, Session};
use candycost::suggestion_mode::{ActionKind, SuggestionState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting CandyCost calculator");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let lang = env::var("CANDY_LANG").ok();
    let lang = detect_language(lang.as_deref());

    // A remote catalog URL takes precedence; otherwise serve from a local file
    if let Ok(base_url) = env::var("CANDY_CATALOG_URL") {
        info!("Using HTTP catalog at: {}", base_url);
        let mut catalog = HttpCatalog::new(base_url);
        if let Ok(token) = env::var("CANDY_API_TOKEN") {
            catalog = catalog.with_token(token);
        }
        run(Session::open(catalog), lang).await
    } else {
        let path =
            env::var("CANDY_CATALOG_PATH").unwrap_or_else(|_| "data/products.json".to_string());
        info!("Using file catalog at: {}", path);
        let catalog = InMemoryCatalog::from_json_file(&path)?;
        run(Session::open(catalog), lang).await
    }
}

/// Drive one calculator session from stdin commands.
///
/// The engine itself is front-end agnostic; this REPL is just one consumer
/// of its command interface.
async fn run<C: CatalogAccessor>(mut session: Session<C>, lang: &str) -> Result<()> {
    let lang = Some(lang);
    let stdin = io::stdin();
    let mut suggestions = SuggestionState::default();

    println!("CandyCost · {}", t_lang("loading", lang));
    print_help();
    prompt(&session, lang)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        let (command, rest) = match input.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => print_help(),
            "list" => print_selection(&session, lang),
            "go" => match session.invoke_action(rest).await {
                Ok(ActionOutcome::Added { product, .. }) => {
                    suggestions = SuggestionState::default();
                    println!("{}", t_args_lang("row-added", &[("name", &product.name)], lang));
                    print_selection(&session, lang);
                }
                Ok(ActionOutcome::SearchResults(products)) => {
                    if products.is_empty() {
                        println!("{}", t_lang("no-results", lang));
                    }
                    for product in &products {
                        println!(
                            "  {} · {} · {}",
                            product.name,
                            product.unit,
                            format_unit_price(product.price_per_unit)
                        );
                    }
                }
                Err(err) => println!(
                    "{}",
                    t_args_lang("catalog-error", &[("reason", &err.to_string())], lang)
                ),
            },
            "pick" => {
                let index: usize = rest.parse().unwrap_or(0);
                match suggestions.candidates.get(index) {
                    Some(product) => {
                        let product = product.clone();
                        session.select_suggestion(&product);
                        suggestions = SuggestionState::default();
                        print_selection(&session, lang);
                    }
                    None => println!("{}", t_lang("no-results", lang)),
                }
            }
            "qty" => {
                if let Some((index, value)) = rest.split_once(' ') {
                    if let Some(row_id) = row_id_at(&session, index) {
                        session.set_quantity_input(row_id, value);
                        print_selection(&session, lang);
                    }
                }
            }
            "unit" => {
                if let Some((index, label)) = rest.split_once(' ') {
                    match (row_id_at(&session, index), label.parse::<Unit>()) {
                        (Some(row_id), Ok(unit)) => {
                            session.set_entry_unit(row_id, unit);
                            print_selection(&session, lang);
                        }
                        (_, Err(err)) => println!("{}", err),
                        _ => {}
                    }
                }
            }
            "del" => {
                if let Some(row_id) = row_id_at(&session, rest) {
                    session.remove_selected(row_id);
                    print_selection(&session, lang);
                }
            }
            // Anything else refreshes suggestions for the typed term
            _ => match session.get_suggestion_state(input).await {
                Ok(state) => {
                    for (i, product) in state.candidates.iter().enumerate() {
                        println!(
                            "  [{}] {} · {} · {}",
                            i,
                            product.name,
                            product.unit,
                            format_unit_price(product.price_per_unit)
                        );
                    }
                    suggestions = state;
                }
                Err(err) => {
                    println!(
                        "{}",
                        t_args_lang("catalog-error", &[("reason", &err.to_string())], lang)
                    );
                }
            },
        }

        prompt(&session, lang)?;
    }

    session.close();
    Ok(())
}

/// Resolve a zero-based display index to a stable row id.
fn row_id_at<C: CatalogAccessor>(session: &Session<C>, index: &str) -> Option<RowId> {
    let index: usize = index.trim().parse().ok()?;
    session.rows().get(index).map(|row| row.row_id)
}

fn print_selection<C: CatalogAccessor>(session: &Session<C>, lang: Option<&str>) {
    if session.rows().is_empty() {
        println!("{}", t_lang("selection-empty", lang));
    }
    for (i, row) in session.rows().iter().enumerate() {
        println!(
            "  [{}] {} · {} {} ({}: {} · {})",
            i,
            row.name,
            row.qty,
            row.entry_unit,
            t_lang("base-unit", lang),
            row.base_unit,
            format_unit_price(row.price_per_unit)
        );
    }
    let aggregate = session.aggregate();
    println!(
        "  {}: {}   {}: {}",
        t_lang("total-cost", lang),
        format_amount(aggregate.total_cost),
        t_lang("suggested-price", lang),
        format_amount(aggregate.suggested_price)
    );
}

fn prompt<C: CatalogAccessor>(session: &Session<C>, lang: Option<&str>) -> Result<()> {
    // The single action button: its label tracks the controller state
    let label = match session.action() {
        ActionKind::AddFirst => t_lang("add", lang),
        ActionKind::Search => t_lang("search", lang),
    };
    print!("[go = {}] > ", label);
    io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!("  <term>          refresh suggestions for a term");
    println!("  go [term]       press the action button (add top suggestion, or search)");
    println!("  pick <n>        add suggestion n from the last list");
    println!("  qty <row> <v>   set a row's quantity");
    println!("  unit <row> <u>  set a row's entry unit (g kg ml l unidad h $)");
    println!("  del <row>       remove a row");
    println!("  list            show the selection and totals");
    println!("  quit            leave");
}
