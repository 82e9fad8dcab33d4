use super::{add, Context};
use crate::harness::session::SubscriptionInfo;
use crate::harness::{HarnessError, RegistryBuilder};

pub(super) fn register_realtime(
    builder: &mut RegistryBuilder,
    ctx: &Context,
) -> Result<(), HarnessError> {
    add(builder, ctx, "Test Realtime", test_realtime, |info: &SubscriptionInfo| {
        vec![
            "Realtime connection active".to_string(),
            format!("  Channels subscribed: {}", info.channels.len()),
            format!(
                "  Connection status: {}",
                if info.connected { "Connected" } else { "Disconnected" }
            ),
        ]
    })
}

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "Ping Server", ping, |pong: &String| {
        vec![format!("Server ping successful: {pong}")]
    })?;
    add(builder, ctx, "Clear Output", clear_output, |_: &()| {
        vec!["Output cleared".to_string()]
    })?;
    add(builder, ctx, "Clear Realtime Events", clear_events, |_: &()| {
        vec!["Realtime events cleared".to_string()]
    })?;
    add(builder, ctx, "See cookies", see_cookies, |(count, contents): &(usize, String)| {
        vec![
            format!("Cookies count: {count}"),
            format!("Cookies: {contents}"),
        ]
    })?;
    Ok(())
}

async fn test_realtime(ctx: Context) -> Result<SubscriptionInfo, HarnessError> {
    ctx.session
        .subscription_info()
        .ok_or_else(|| HarnessError::precondition("Realtime not initialized"))
}

async fn ping(ctx: Context) -> Result<String, HarnessError> {
    Ok(ctx.services()?.client.ping().await?)
}

async fn clear_output(ctx: Context) -> Result<(), HarnessError> {
    ctx.output.clear();
    Ok(())
}

async fn clear_events(ctx: Context) -> Result<(), HarnessError> {
    ctx.events.clear();
    Ok(())
}

/// Cookie values are masked; only names and lengths are shown.
async fn see_cookies(ctx: Context) -> Result<(usize, String), HarnessError> {
    let cookies = ctx.services()?.client.cookies();
    Ok((cookies.len(), cookies.contents()))
}
