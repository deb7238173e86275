//! Protected API operation enum.

use std::fmt;

/// The settings document family an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsScope {
    /// Site-wide general settings (contact details, social links, hours).
    General,
    /// Outgoing email configuration.
    Email,
    /// Per-page SEO metadata.
    Seo,
}

impl SettingsScope {
    /// Collection name used for storage and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Email => "email",
            Self::Seo => "seo",
        }
    }
}

impl fmt::Display for SettingsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All operations served behind the protected API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsOperation {
    // General settings
    /// Read the general settings document.
    GetGeneralSettings,
    /// Merge fields into the general settings document.
    UpdateGeneralSettings,

    // Email settings
    /// Read the email configuration.
    GetEmailSettings,
    /// Merge fields into the email configuration.
    UpdateEmailSettings,

    // SEO
    /// List SEO settings for every page.
    ListSeoSettings,
    /// Read the SEO settings of one page.
    GetSeoSettings,
    /// Merge fields into the SEO settings of one page.
    UpdateSeoSettings,
}

impl SettingsOperation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetGeneralSettings => "GetGeneralSettings",
            Self::UpdateGeneralSettings => "UpdateGeneralSettings",
            Self::GetEmailSettings => "GetEmailSettings",
            Self::UpdateEmailSettings => "UpdateEmailSettings",
            Self::ListSeoSettings => "ListSeoSettings",
            Self::GetSeoSettings => "GetSeoSettings",
            Self::UpdateSeoSettings => "UpdateSeoSettings",
        }
    }

    /// The document family this operation touches.
    #[must_use]
    pub fn scope(&self) -> SettingsScope {
        match self {
            Self::GetGeneralSettings | Self::UpdateGeneralSettings => SettingsScope::General,
            Self::GetEmailSettings | Self::UpdateEmailSettings => SettingsScope::Email,
            Self::ListSeoSettings | Self::GetSeoSettings | Self::UpdateSeoSettings => {
                SettingsScope::Seo
            }
        }
    }

    /// Whether the operation modifies stored data.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::UpdateGeneralSettings | Self::UpdateEmailSettings | Self::UpdateSeoSettings
        )
    }

    /// Whether the operation reads a request body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.is_mutation()
    }

    /// Whether the operation only reads data the public site already shows.
    ///
    /// Email settings hold outgoing mail configuration and are never public.
    #[must_use]
    pub fn is_public_read(&self) -> bool {
        matches!(
            self,
            Self::GetGeneralSettings | Self::ListSeoSettings | Self::GetSeoSettings
        )
    }
}

impl fmt::Display for SettingsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
