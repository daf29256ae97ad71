// Firenet authentication
//
// Form-based login. The login page sets a session cookie in the client's
// jar; subsequent requests use that cookie automatically.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::FirenetClient;
use crate::error::{Error, preview};

/// Substring present only on the page served after a successful login.
///
/// Firenet has no structured login result: a good login redirects to the
/// summary dashboard, a bad one re-renders the login form.
pub const LOGIN_SUCCESS_MARKER: &str = "summary";

impl FirenetClient {
    /// Authenticate with the service using email/password.
    ///
    /// `POST /web/login` with form fields `email` and `password`.
    ///
    /// On success the session cookie is stored in the client's cookie jar
    /// and used for all subsequent requests.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url("web/login")?;
        debug!("logging in at {}", url);

        let form = [("email", email), ("password", password.expose_secret())];
        let resp = self.http().post(url).form(&form).send().await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        if !body.contains(LOGIN_SUCCESS_MARKER) {
            return Err(Error::Authentication {
                message: "login page did not lead to the summary dashboard".into(),
            });
        }

        debug!("login successful");
        Ok(())
    }
}
