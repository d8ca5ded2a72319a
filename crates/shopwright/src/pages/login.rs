//! Home and `/login` page.

use super::PageObject;
use crate::locator::{AriaRole, Locator};
use crate::result::ShopResult;
use crate::session::{AuthState, Session};
use crate::wait::LoadState;
use tracing::info;

/// Login and signup forms plus the header link leading to them
#[derive(Debug)]
pub struct LoginPage<'a> {
    session: &'a Session,
    /// Site logo
    pub logo: Locator,
    /// Header ` Signup / Login` link
    pub signup_login_link: Locator,
    /// Email input of the login form
    pub login_email_input: Locator,
    /// Password input
    pub login_password_input: Locator,
    /// Login submit
    pub login_button: Locator,
    /// Name input of the signup form
    pub signup_name_input: Locator,
    /// Email input of the signup form
    pub signup_email_input: Locator,
    /// Signup submit
    pub signup_button: Locator,
    /// `Login to your account`
    pub login_form_heading: Locator,
    /// `New User Signup!`
    pub signup_form_heading: Locator,
}

impl<'a> LoginPage<'a> {
    /// Bind the page to `session`
    pub fn new(session: &'a Session) -> Self {
        // Both forms share the `Email Address` placeholder; scope by form first.
        let login_form = Locator::css("form").filter_has_text("Login");
        let signup_form = Locator::css("form").filter_has_text("Signup");
        Self {
            session,
            logo: Locator::role(AriaRole::Img, "Website for automation practice"),
            signup_login_link: Locator::role(AriaRole::Link, " Signup / Login"),
            login_email_input: login_form.get_by_placeholder("Email Address"),
            login_password_input: Locator::placeholder("Password"),
            login_button: Locator::role(AriaRole::Button, "Login"),
            signup_name_input: Locator::placeholder("Name"),
            signup_email_input: signup_form.get_by_placeholder("Email Address"),
            signup_button: Locator::role(AriaRole::Button, "Signup"),
            login_form_heading: Locator::role(AriaRole::Heading, "Login to your account"),
            signup_form_heading: Locator::role(AriaRole::Heading, "New User Signup!"),
        }
    }

    /// The `Logged in as` marker for `display_name`
    pub fn logged_in_marker(display_name: &str) -> Locator {
        Locator::text(format!(" Logged in as {display_name}"))
    }

    /// Open the site root
    pub async fn navigate(&self) -> ShopResult<()> {
        self.session.goto("/").await
    }

    /// Follow the header link to `/login`
    pub async fn go_to_login_page(&self) -> ShopResult<()> {
        self.session.click(&self.signup_login_link).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }

    /// Fill and submit the login form.
    ///
    /// Starts the session's single authentication attempt; a second call on
    /// the same session fails with `InvalidState`.
    pub async fn login(&self, email: &str, password: &str) -> ShopResult<()> {
        self.session.begin_authentication()?;
        let submitted = self.submit_login(email, password).await;
        if submitted.is_err() {
            self.session.fail_authentication();
        }
        submitted
    }

    async fn submit_login(&self, email: &str, password: &str) -> ShopResult<()> {
        self.session.fill(&self.login_email_input, email).await?;
        self.session.fill(&self.login_password_input, password).await?;
        self.session.click(&self.login_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }

    /// Fill and submit the signup form
    pub async fn signup(&self, name: &str, email: &str) -> ShopResult<()> {
        self.session.fill(&self.signup_name_input, name).await?;
        self.session.fill(&self.signup_email_input, email).await?;
        self.session.click(&self.signup_button).await?;
        self.session.settle(LoadState::DomContentLoaded).await
    }

    /// Logo is visible
    pub async fn verify_logo_visible(&self) -> ShopResult<()> {
        self.session.expect(&self.logo).to_be_visible().await
    }

    /// Header link is visible and reads `Signup / Login`
    pub async fn verify_signup_login_link_visible(&self) -> ShopResult<()> {
        let expect = self.session.expect(&self.signup_login_link);
        expect.to_be_visible().await?;
        expect.to_contain_text("Signup / Login").await
    }

    /// Login form heading is visible
    pub async fn verify_login_form_visible(&self) -> ShopResult<()> {
        self.session.expect(&self.login_form_heading).to_be_visible().await
    }

    /// Signup form heading is visible
    pub async fn verify_signup_form_visible(&self) -> ShopResult<()> {
        self.session.expect(&self.signup_form_heading).to_be_visible().await
    }

    /// Both forms are visible
    pub async fn verify_login_page_loaded(&self) -> ShopResult<()> {
        self.verify_login_form_visible().await?;
        self.verify_signup_form_visible().await
    }

    /// ` Logged in as {display_name}` becomes visible.
    ///
    /// Completes a pending authentication attempt on success and fails it
    /// otherwise.
    pub async fn verify_logged_in_as(&self, display_name: &str) -> ShopResult<()> {
        let marker = Self::logged_in_marker(display_name);
        match self.session.expect(&marker).to_be_visible().await {
            Ok(()) => {
                if self.session.auth_state() == AuthState::Authenticating {
                    self.session.complete_authentication(display_name)?;
                }
                info!(display_name, "Logged in");
                Ok(())
            }
            Err(e) => {
                self.session.fail_authentication();
                Err(e)
            }
        }
    }
}

impl PageObject for LoginPage<'_> {
    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("logo", &self.logo),
            ("signup_login_link", &self.signup_login_link),
            ("login_email_input", &self.login_email_input),
            ("login_password_input", &self.login_password_input),
            ("login_button", &self.login_button),
            ("signup_name_input", &self.signup_name_input),
            ("signup_email_input", &self.signup_email_input),
            ("signup_button", &self.signup_button),
            ("login_form_heading", &self.login_form_heading),
            ("signup_form_heading", &self.signup_form_heading),
        ]
    }
}
