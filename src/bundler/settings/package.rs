//! Product identity.

/// Product identity used in artifact names and signatures.
///
/// Maps from the `[product]` section of `release.toml`.
///
/// # Examples
///
/// ```
/// use release_builder::bundler::PackageSettings;
///
/// let settings = PackageSettings {
///     product_name: "product".into(),
///     ..Default::default()
/// };
/// assert_eq!(settings.display_name, "Adblock Plus");
/// ```
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct PackageSettings {
    /// Prefix of every installer artifact name.
    ///
    /// Example: `adblockplusie` gives `adblockplusie-1.2-x64.msi`
    #[serde(rename = "name")]
    pub product_name: String,

    /// Human-readable name embedded in signatures (`signtool /d`).
    pub display_name: String,

    /// Product URL embedded in signatures (`signtool /du`).
    pub url: String,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            product_name: "adblockplusie".into(),
            display_name: "Adblock Plus".into(),
            url: "http://adblockplus.org/".into(),
        }
    }
}
