use super::{add, Context, REDIRECT_URL};
use crate::account::models::{
    Jwt, LogList, OAuthProvider, Preferences, Session, SessionList, Token, User,
};
use crate::harness::render::truncate_secret;
use crate::harness::{HarnessError, RegistryBuilder};
use crate::id;
use serde_json::json;
use url::Url;

const OAUTH_PROVIDERS: [(&str, OAuthProvider); 4] = [
    ("OAuth with Google", OAuthProvider::Google),
    ("OAuth with GitHub", OAuthProvider::Github),
    ("OAuth with Apple", OAuthProvider::Apple),
    ("OAuth with Facebook", OAuthProvider::Facebook),
];

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "Is Logged?", get_user, |user: &User| {
        vec![format!("User is logged in: {} ({})", user.name, user.email)]
    })?;
    add(builder, ctx, "Register Account", register_account, |user: &User| {
        vec![format!("Account created: {} ({})", user.name, user.email)]
    })?;
    add(builder, ctx, "Login", login, |session: &Session| {
        vec![format!("Login successful: {}", session.user_id)]
    })?;
    add(builder, ctx, "Login Anonymously", login_anonymously, |session: &Session| {
        vec![format!("Anonymous login successful: {}", session.user_id)]
    })?;
    for (label, provider) in OAUTH_PROVIDERS {
        add(
            builder,
            ctx,
            label,
            move |ctx| oauth_url(ctx, provider),
            move |url: &Url| {
                vec![
                    format!("{} OAuth initiated", provider.display_name()),
                    format!("  Open in a browser: {url}"),
                ]
            },
        )?;
    }
    add(builder, ctx, "Create JWT", create_jwt, |jwt: &Jwt| {
        vec![format!("JWT created: {}", truncate_secret(&jwt.jwt, 50))]
    })?;
    add(builder, ctx, "Get User Info", get_user, user_info)?;
    add(builder, ctx, "Update Name", update_name, |user: &User| {
        vec![format!("Name updated to: {}", user.name)]
    })?;
    add(builder, ctx, "Update Email", update_email, |user: &User| {
        vec![format!("Email updated to: {}", user.email)]
    })?;
    add(builder, ctx, "Update Password", update_password, |user: &User| {
        vec![format!("Password updated successfully {}", user.password_update)]
    })?;
    add(builder, ctx, "Update Preferences", update_prefs, |user: &User| {
        vec![format!(
            "Preferences updated for {} ({} keys)",
            user.name,
            user.prefs.len()
        )]
    })?;
    add(builder, ctx, "Get User Sessions", list_sessions, sessions_summary)?;
    add(builder, ctx, "Get User Logs", list_logs, logs_summary)?;
    add(builder, ctx, "Create Verification", create_verification, |token: &Token| {
        vec![format!("Email verification sent: {}", token.expire)]
    })?;
    add(
        builder,
        ctx,
        "Create Phone Verification",
        create_phone_verification,
        |token: &Token| vec![format!("Phone verification sent: {}", token.expire)],
    )?;
    add(builder, ctx, "Create Recovery", create_recovery, |token: &Token| {
        vec![format!("Password recovery sent: {}", token.expire)]
    })?;
    add(builder, ctx, "Update Status (Block)", update_status, |user: &User| {
        vec![format!("Account status updated: {}", user.status)]
    })?;
    add(builder, ctx, "Delete Sessions", delete_sessions, |_: &()| {
        vec!["All sessions deleted".to_string()]
    })?;
    add(builder, ctx, "Delete Current Session", delete_current_session, |_: &()| {
        vec!["Current session deleted".to_string()]
    })?;
    add(builder, ctx, "Logout", logout, |_: &()| {
        vec!["Logged out successfully".to_string()]
    })?;
    Ok(())
}

async fn get_user(ctx: Context) -> Result<User, HarnessError> {
    Ok(ctx.services()?.account.get().await?)
}

async fn register_account(ctx: Context) -> Result<User, HarnessError> {
    let (email, password, name) = (ctx.inputs.email(), ctx.inputs.password(), ctx.inputs.name());
    let user = ctx
        .services()?
        .account
        .create(&id::unique(), &email, &password, Some(name.as_str()))
        .await?;
    Ok(user)
}

async fn login(ctx: Context) -> Result<Session, HarnessError> {
    let (email, password) = (ctx.inputs.email(), ctx.inputs.password());
    let session = ctx
        .services()?
        .account
        .create_email_password_session(&email, &password)
        .await?;
    Ok(session)
}

async fn login_anonymously(ctx: Context) -> Result<Session, HarnessError> {
    Ok(ctx.services()?.account.create_anonymous_session().await?)
}

async fn oauth_url(ctx: Context, provider: OAuthProvider) -> Result<Url, HarnessError> {
    Ok(ctx
        .services()?
        .account
        .create_oauth2_session(
            provider,
            ctx.oauth.success_url.as_deref(),
            ctx.oauth.failure_url.as_deref(),
            &[],
        )?)
}

async fn create_jwt(ctx: Context) -> Result<Jwt, HarnessError> {
    Ok(ctx.services()?.account.create_jwt().await?)
}

fn user_info(user: &User) -> Vec<String> {
    vec![
        "User Info:".to_string(),
        format!("  Name: {}", user.name),
        format!("  Email: {}", user.email),
        format!("  ID: {}", user.id),
        format!("  Created: {}", user.created_at),
        format!("  Status: {}", user.status),
        format!("  Email Verified: {}", user.email_verification),
        format!("  Phone Verified: {}", user.phone_verification),
    ]
}

async fn update_name(ctx: Context) -> Result<User, HarnessError> {
    let name = ctx.inputs.name();
    Ok(ctx.services()?.account.update_name(&name).await?)
}

async fn update_email(ctx: Context) -> Result<User, HarnessError> {
    let (email, password) = (ctx.inputs.email(), ctx.inputs.password());
    Ok(ctx.services()?.account.update_email(&email, &password).await?)
}

async fn update_password(ctx: Context) -> Result<User, HarnessError> {
    let password = ctx.inputs.password();
    Ok(ctx
        .services()?
        .account
        .update_password(&password, None)
        .await?)
}

async fn update_prefs(ctx: Context) -> Result<User, HarnessError> {
    let mut prefs = Preferences::new();
    prefs.insert("theme".to_string(), json!("dark"));
    prefs.insert("language".to_string(), json!("en"));
    prefs.insert("notifications".to_string(), json!(true));
    Ok(ctx.services()?.account.update_prefs(&prefs).await?)
}

async fn list_sessions(ctx: Context) -> Result<SessionList, HarnessError> {
    Ok(ctx.services()?.account.list_sessions().await?)
}

fn sessions_summary(list: &SessionList) -> Vec<String> {
    let mut lines = vec![format!("User has {} sessions", list.total)];
    lines.extend(
        list.sessions
            .iter()
            .map(|s| format!("  Session: {} - {}", s.client_name, s.created_at)),
    );
    lines
}

async fn list_logs(ctx: Context) -> Result<LogList, HarnessError> {
    Ok(ctx.services()?.account.list_logs().await?)
}

fn logs_summary(list: &LogList) -> Vec<String> {
    let mut lines = vec![format!("User has {} logs", list.total)];
    lines.extend(
        list.logs
            .iter()
            .take(5)
            .map(|log| format!("  Log: {} - {}", log.event, log.time)),
    );
    lines
}

async fn create_verification(ctx: Context) -> Result<Token, HarnessError> {
    Ok(ctx
        .services()?
        .account
        .create_verification(REDIRECT_URL)
        .await?)
}

async fn create_phone_verification(ctx: Context) -> Result<Token, HarnessError> {
    Ok(ctx.services()?.account.create_phone_verification().await?)
}

async fn create_recovery(ctx: Context) -> Result<Token, HarnessError> {
    let email = ctx.inputs.email();
    Ok(ctx
        .services()?
        .account
        .create_recovery(&email, REDIRECT_URL)
        .await?)
}

async fn update_status(ctx: Context) -> Result<User, HarnessError> {
    Ok(ctx.services()?.account.update_status().await?)
}

async fn delete_sessions(ctx: Context) -> Result<(), HarnessError> {
    Ok(ctx.services()?.account.delete_sessions().await?)
}

async fn delete_current_session(ctx: Context) -> Result<(), HarnessError> {
    Ok(ctx.services()?.account.delete_session("current").await?)
}

async fn logout(ctx: Context) -> Result<(), HarnessError> {
    let services = ctx.services()?;
    services.account.delete_session("current").await?;
    services.client.clear_session();
    Ok(())
}
