// src/views/auth.rs

use super::layout;
use crate::utils::html::escape;

/// Notice shown on the sign-in screen after a sign-up that needs email confirmation.
pub const CONFIRM_EMAIL_NOTICE: &str = "Check your inbox to confirm your email, then sign in.";

pub fn sign_in_page(email: &str, error: Option<&str>, notice: Option<&str>) -> String {
    let error = error
        .map(|msg| format!(r#"<div class="error" role="alert">{}</div>"#, escape(msg)))
        .unwrap_or_default();
    let notice = notice
        .map(|msg| format!(r#"<div class="notice">{}</div>"#, escape(msg)))
        .unwrap_or_default();

    let body = format!(
        r#"<div class="centered auth">
  <div class="logo big">MiniTwitter</div>
  <h1>Sign in to MiniTwitter</h1>
  {notice}
  {error}
  <form method="post" action="/" class="stack">
    <label>Email
      <input required type="email" name="email" value="{email}" placeholder="you@example.com">
    </label>
    <label>Password
      <input required type="password" name="password" placeholder="........">
    </label>
    <button type="submit" class="button primary wide">Sign In</button>
  </form>
  <p class="muted">Don't have an account? <a href="/signup">Sign up</a></p>
</div>"#,
        notice = notice,
        error = error,
        email = escape(email),
    );
    layout("Sign in to MiniTwitter", &body)
}

/// Values echoed back into the sign-up form after a failed attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignUpValues<'a> {
    pub username: &'a str,
    pub display_name: &'a str,
    pub email: &'a str,
}

pub fn sign_up_page(values: SignUpValues<'_>, alert: Option<&str>) -> String {
    let alert = alert
        .map(|msg| {
            format!(
                r#"<div class="alert" role="alert">Sign up failed: {}</div>"#,
                escape(msg)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<div class="centered auth">
  <div class="logo big">X</div>
  <h1>Create your account</h1>
  {alert}
  <form method="post" action="/signup" class="stack">
    <label>Username
      <input required type="text" name="username" value="{username}" placeholder="johndoe">
    </label>
    <label>Display Name
      <input required type="text" name="display_name" value="{display_name}" placeholder="John Doe">
    </label>
    <label>Email
      <input required type="email" name="email" value="{email}" placeholder="you@example.com">
    </label>
    <label>Password
      <input required type="password" name="password" placeholder="........">
    </label>
    <button type="submit" class="button primary wide">Sign Up</button>
  </form>
  <p class="muted">Already have an account? <a href="/">Sign in</a></p>
</div>"#,
        alert = alert,
        username = escape(values.username),
        display_name = escape(values.display_name),
        email = escape(values.email),
    );
    layout("Create your account", &body)
}
