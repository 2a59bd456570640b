//! Login, logout and whoami.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use scorelinks_core::{Credentials, User};

use super::ApiContext;

pub async fn login(ctx: &ApiContext, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    let data = ctx
        .auth()
        .login(&Credentials::new(email, password))
        .await
        .context("login failed")?;

    println!("Logged in as {}", data.user.display_name());
    Ok(())
}

pub fn logout(ctx: &ApiContext) {
    if ctx.session().is_authenticated() {
        ctx.auth().logout();
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
}

pub async fn whoami(ctx: &ApiContext, refresh: bool) -> Result<()> {
    ctx.require_login()?;

    let user = if refresh {
        ctx.auth()
            .refresh_user()
            .await
            .map_err(|e| ctx.api_error(e))?
            .or_else(|| ctx.session().current_user())
    } else {
        ctx.session().current_user()
    };

    let Some(user) = user else {
        bail!("No user profile stored. Run `scorelinks whoami --refresh`.");
    };
    print_user(&user);
    Ok(())
}

fn print_user(user: &User) {
    println!("Name:          {}", user.display_name());
    println!("Email:         {}", user.email);
    println!("User ID:       {}", user.id);
    println!("Member since:  {}", format_timestamp(&user.created_at));
    println!("Last updated:  {}", format_timestamp(&user.updated_at));
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn prompt(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_timestamp_uses_minutes_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let formatted = format_timestamp(&ts);

        assert_eq!(formatted.len(), "2024-05-01 09:00".len());
        assert!(formatted.starts_with("2024-0"));
    }
}
