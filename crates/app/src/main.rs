use showcase_app::config::ShowcaseConfig;
use showcase_app::context::AppContext;
use showcase_app::telemetry;
use showcase_app::vote::VoteOutcome;

/// User the demo toggle acts as.
const DEMO_USER: &str = "demo-user";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    telemetry::init_tracing();

    // --- Configuration ---
    let config = match ShowcaseConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        demo = config.backend.is_none(),
        page_size = config.gallery_page_size,
        "Loaded configuration",
    );

    // --- Context ---
    let ctx = match AppContext::from_config(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::error!(error = %err, "Failed to initialize clients");
            std::process::exit(1);
        }
    };

    // --- Gallery ---
    let cards = match ctx.gallery().await {
        Ok(cards) => cards,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load gallery");
            std::process::exit(1);
        }
    };
    tracing::info!(count = cards.len(), "Gallery loaded");
    for card in &cards {
        tracing::info!(
            id = %card.id,
            title = %card.title,
            author = card.author_label(),
            category = card.category_name.as_deref().unwrap_or("-"),
            upvotes = card.upvote_count,
            path = %card.detail_path(),
            "Gallery card",
        );
    }

    match ctx.categories().await {
        Ok(categories) => tracing::info!(count = categories.len(), "Categories loaded"),
        Err(err) => tracing::warn!(error = %err, "Failed to load categories"),
    }

    // --- Demo vote ---
    if !ctx.is_demo() {
        return;
    }
    let Some(first) = cards.first() else {
        return;
    };
    let result = match ctx.mount_vote_controller(&first.id, Some(DEMO_USER)).await {
        Ok(controller) => controller.toggle_vote(Some(DEMO_USER)).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(VoteOutcome::Voted(view)) => {
            tracing::info!(print_id = %first.id, count = view.count, "Demo upvote recorded")
        }
        Ok(outcome) => tracing::info!(print_id = %first.id, ?outcome, "Demo upvote finished"),
        Err(err) => tracing::error!(print_id = %first.id, error = %err, "Demo upvote failed"),
    }
}
