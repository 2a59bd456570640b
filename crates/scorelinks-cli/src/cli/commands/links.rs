//! API-link command handlers.

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use comfy_table::{ContentArrangement, Table};
use scorelinks_core::clipboard::SystemClipboard;
use scorelinks_core::links::validate_link_id;
use scorelinks_core::{ApiLink, LinkDirectory, LinkDraft, LinkMutation, LinkType};

use super::ApiContext;

pub async fn list(ctx: &ApiContext, json: bool) -> Result<()> {
    ctx.require_login()?;
    let links = ctx.links().list().await.map_err(|e| ctx.api_error(e))?;

    if json {
        let out = serde_json::to_string_pretty(&links).context("serialize links")?;
        println!("{out}");
    } else {
        print_links(&links);
    }
    Ok(())
}

pub async fn create(ctx: &ApiContext, match_id: &str, link_type: LinkType) -> Result<()> {
    let draft = LinkDraft::new(match_id, link_type);
    apply(ctx, LinkMutation::Create(draft)).await
}

pub async fn update(
    ctx: &ApiContext,
    link_id: &str,
    match_id: &str,
    link_type: LinkType,
) -> Result<()> {
    let mutation = LinkMutation::Update {
        link_id: validate_link_id(link_id)?.to_string(),
        draft: LinkDraft::new(match_id, link_type),
    };
    apply(ctx, mutation).await
}

pub async fn toggle(ctx: &ApiContext, link_id: &str) -> Result<()> {
    let mutation = LinkMutation::Toggle {
        link_id: validate_link_id(link_id)?.to_string(),
    };
    apply(ctx, mutation).await
}

pub async fn copy(ctx: &ApiContext, link_id: &str) -> Result<()> {
    ctx.require_login()?;
    let link_id = validate_link_id(link_id)?;
    let links = ctx.links().list().await.map_err(|e| ctx.api_error(e))?;

    let link = links
        .iter()
        .find(|link| link.link_id == link_id)
        .ok_or_else(|| anyhow!("No API link with id '{link_id}'"))?;

    LinkDirectory::copy_public_url(link, &SystemClipboard).context("copy public URL")?;
    println!("Copied! {}", link.public_url);
    Ok(())
}

async fn apply(ctx: &ApiContext, mutation: LinkMutation) -> Result<()> {
    ctx.require_login()?;
    let what = mutation.describe();
    let links = ctx
        .links()
        .apply(&mutation)
        .await
        .map_err(|e| ctx.api_error(e))
        .with_context(|| format!("{what} failed"))?;

    println!("Done: {what}");
    print_links(&links);
    Ok(())
}

fn print_links(links: &[ApiLink]) {
    if links.is_empty() {
        println!("No API links found.");
        return;
    }
    println!("{}", links_table(links));
    println!("{}", count_line(links.len()));
}

fn links_table(links: &[ApiLink]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Link ID", "Match ID", "Type", "Status", "Accesses", "Created", "Public URL",
    ]);

    for link in links {
        table.add_row(vec![
            link.link_id.clone(),
            link.match_id.clone(),
            link.link_type.label().to_string(),
            if link.is_active { "Active" } else { "Inactive" }.to_string(),
            link.access_count.to_string(),
            link.created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string(),
            link.public_url.clone(),
        ]);
    }

    table.to_string()
}

fn count_line(count: usize) -> String {
    format!("{count} API link(s) found")
}
