//! Account link commands

use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::linking::{LinkRepository, PlayerLink};
use crate::domain::player::PlayerId;
use crate::error::{Error, Result};
use crate::voxyl::VoxylClient;

/// Result of a link request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
    Linked(PlayerLink),
    /// The account was already linked and `replace` was not requested
    AlreadyLinked(PlayerLink),
}

/// How a Discord account's network integration relates to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "player", rename_all = "snake_case")]
pub enum IntegrationCheck {
    /// The account and the player are integrated with each other
    Verified,
    /// No integration exists for the account or the player
    NotIntegrated,
    /// The account is integrated with a different player
    IntegratedElsewhere(PlayerId),
}

/// Link a Discord account to a player
///
/// An existing link is kept unless `replace` is set.
pub async fn link(
    pool: &SqlitePool,
    discord_id: u64,
    player: &PlayerId,
    replace: bool,
) -> Result<LinkOutcome> {
    let repo = LinkRepository::new(pool.clone());

    if !replace {
        if let Some(existing) = repo.get(discord_id).await? {
            return Ok(LinkOutcome::AlreadyLinked(existing));
        }
    }

    repo.link(discord_id, player).await.map(LinkOutcome::Linked)
}

/// Remove a link, returning what it pointed at
pub async fn unlink(pool: &SqlitePool, discord_id: u64) -> Result<PlayerLink> {
    let repo = LinkRepository::new(pool.clone());
    let existing = repo
        .get(discord_id)
        .await?
        .ok_or(Error::NotLinked(discord_id))?;

    repo.unlink(discord_id).await?;
    Ok(existing)
}

/// Current link for a Discord account
pub async fn linked(pool: &SqlitePool, discord_id: u64) -> Result<Option<PlayerLink>> {
    LinkRepository::new(pool.clone()).get(discord_id).await
}

/// Check that `discord_id` and `player` are integrated with each other
pub async fn verify_integration(
    client: &VoxylClient,
    discord_id: u64,
    player: &PlayerId,
) -> Result<IntegrationCheck> {
    let (integrated_player, integrated_discord) = tokio::try_join!(
        client.player_for_discord(discord_id),
        client.discord_for_player(player),
    )?;

    Ok(classify_integration(
        discord_id,
        player,
        integrated_player,
        integrated_discord,
    ))
}

fn classify_integration(
    discord_id: u64,
    player: &PlayerId,
    integrated_player: Option<PlayerId>,
    integrated_discord: Option<u64>,
) -> IntegrationCheck {
    match (integrated_player, integrated_discord) {
        (Some(found), Some(id)) if &found == player && id == discord_id => IntegrationCheck::Verified,
        (Some(found), _) if &found != player => IntegrationCheck::IntegratedElsewhere(found),
        _ => IntegrationCheck::NotIntegrated,
    }
}
