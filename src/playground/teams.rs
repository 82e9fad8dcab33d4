use super::{add, Context, REDIRECT_URL};
use crate::harness::{HarnessError, RegistryBuilder};
use crate::id;
use crate::teams::models::{Invitee, Membership, MembershipList, Preferences, Team, TeamList};
use chrono::Local;
use serde_json::json;

const NO_MEMBERSHIPS: &str = "No memberships found. Create one first!";

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "List Teams", list_teams, |list: &TeamList| {
        let mut lines = vec![format!("Found {} teams", list.total)];
        lines.extend(
            list.teams
                .iter()
                .take(5)
                .map(|team| format!("  Team: {} ({} members)", team.name, team.total)),
        );
        lines
    })?;
    add(builder, ctx, "Create Team", create_team, |team: &Team| {
        vec![format!("Team created: {} ({})", team.name, team.id)]
    })?;
    add(builder, ctx, "Get Team", get_team, |team: &Team| {
        vec![
            format!("Team info: {}", team.name),
            format!("  ID: {}", team.id),
            format!("  Members: {}", team.total),
            format!("  Created: {}", team.created_at),
        ]
    })?;
    add(builder, ctx, "Update Team", update_team, |team: &Team| {
        vec![format!("Team updated: {}", team.name)]
    })?;
    add(builder, ctx, "Delete Team", delete_team, |team_id: &String| {
        vec![format!("Team deleted: {team_id}")]
    })?;
    add(builder, ctx, "List Team Memberships", list_memberships, |list: &MembershipList| {
        let mut lines = vec![format!("Found {} memberships", list.total)];
        lines.extend(
            list.memberships
                .iter()
                .take(5)
                .map(|m| format!("  Member: {} - {}", m.user_name, m.roles.join(", "))),
        );
        lines
    })?;
    add(builder, ctx, "Create Team Membership", create_membership, |m: &Membership| {
        vec![format!("Membership created: {}", m.id)]
    })?;
    add(builder, ctx, "Get Team Membership", get_membership, |m: &Membership| {
        vec![format!("Membership info: {}", m.user_name)]
    })?;
    add(builder, ctx, "Update Team Membership", update_membership, |m: &Membership| {
        vec![format!("Membership updated: {}", m.user_name)]
    })?;
    add(builder, ctx, "Delete Team Membership", delete_membership, |id: &String| {
        vec![format!("Membership deleted: {id}")]
    })?;
    add(builder, ctx, "Update Team Preferences", update_prefs, |prefs: &Preferences| {
        vec![format!("Team preferences updated ({} keys)", prefs.len())]
    })?;
    add(builder, ctx, "Get Team Preferences", get_prefs, |prefs: &Preferences| {
        let mut lines = vec!["Team preferences retrieved".to_string()];
        lines.extend(prefs.iter().map(|(key, value)| format!("  {key}: {value}")));
        lines
    })?;
    Ok(())
}

async fn list_teams(ctx: Context) -> Result<TeamList, HarnessError> {
    Ok(ctx.services()?.teams.list(&[], None).await?)
}

async fn create_team(ctx: Context) -> Result<Team, HarnessError> {
    let name = format!("Playground Team {}", Local::now().format("%Y-%m-%d"));
    let roles = ["owner".to_string()];
    let team = ctx
        .services()?
        .teams
        .create(&id::unique(), &name, Some(&roles[..]))
        .await?;
    ctx.set_team_id(Some(team.id.clone()));
    Ok(team)
}

async fn get_team(ctx: Context) -> Result<Team, HarnessError> {
    let team_id = ctx.team_id()?;
    Ok(ctx.services()?.teams.get(&team_id).await?)
}

async fn update_team(ctx: Context) -> Result<Team, HarnessError> {
    let team_id = ctx.team_id()?;
    let name = format!("Updated Team {}", Local::now().format("%H:%M:%S"));
    Ok(ctx.services()?.teams.update_name(&team_id, &name).await?)
}

async fn delete_team(ctx: Context) -> Result<String, HarnessError> {
    let team_id = ctx.team_id()?;
    ctx.services()?.teams.delete(&team_id).await?;
    ctx.set_team_id(None);
    Ok(team_id)
}

async fn list_memberships(ctx: Context) -> Result<MembershipList, HarnessError> {
    let team_id = ctx.team_id()?;
    Ok(ctx
        .services()?
        .teams
        .list_memberships(&team_id, &[])
        .await?)
}

async fn first_membership(ctx: &Context) -> Result<(String, Membership), HarnessError> {
    let team_id = ctx.team_id()?;
    let list = ctx
        .services()?
        .teams
        .list_memberships(&team_id, &[])
        .await?;
    let first = list
        .memberships
        .into_iter()
        .next()
        .ok_or_else(|| HarnessError::precondition(NO_MEMBERSHIPS))?;
    Ok((team_id, first))
}

async fn create_membership(ctx: Context) -> Result<Membership, HarnessError> {
    let team_id = ctx.team_id()?;
    let invitee = Invitee::email(ctx.inputs.email());
    let roles = ["member".to_string()];
    Ok(ctx
        .services()?
        .teams
        .create_membership(&team_id, &roles, &invitee, Some(REDIRECT_URL))
        .await?)
}

async fn get_membership(ctx: Context) -> Result<Membership, HarnessError> {
    let (team_id, first) = first_membership(&ctx).await?;
    Ok(ctx
        .services()?
        .teams
        .get_membership(&team_id, &first.id)
        .await?)
}

async fn update_membership(ctx: Context) -> Result<Membership, HarnessError> {
    let (team_id, first) = first_membership(&ctx).await?;
    let roles = ["admin".to_string()];
    Ok(ctx
        .services()?
        .teams
        .update_membership(&team_id, &first.id, &roles)
        .await?)
}

async fn delete_membership(ctx: Context) -> Result<String, HarnessError> {
    let (team_id, first) = first_membership(&ctx).await?;
    ctx.services()?
        .teams
        .delete_membership(&team_id, &first.id)
        .await?;
    Ok(first.id)
}

async fn update_prefs(ctx: Context) -> Result<Preferences, HarnessError> {
    let team_id = ctx.team_id()?;
    let mut prefs = Preferences::new();
    prefs.insert("theme".to_string(), json!("dark"));
    prefs.insert("notifications".to_string(), json!(true));
    prefs.insert("language".to_string(), json!("en"));
    Ok(ctx.services()?.teams.update_prefs(&team_id, &prefs).await?)
}

async fn get_prefs(ctx: Context) -> Result<Preferences, HarnessError> {
    let team_id = ctx.team_id()?;
    Ok(ctx.services()?.teams.get_prefs(&team_id).await?)
}
