//! Ordered name resolution for shop-scoped assets.
//!
//! Strategies are tried strictly in [`ResolutionStrategy::ORDER`]; the first
//! one that yields a candidate wins.

use strum::Display;

use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::{Asset, AssetStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStrategy {
    ExactId,
    ExactName,
    CaseInsensitiveName,
    Substring,
}

impl ResolutionStrategy {
    pub const ORDER: [ResolutionStrategy; 4] = [
        Self::ExactId,
        Self::ExactName,
        Self::CaseInsensitiveName,
        Self::Substring,
    ];

    /// Whether `asset` matches `reference` under this strategy alone.
    pub fn matches(&self, asset: &Asset, reference: &str) -> bool {
        match self {
            Self::ExactId => asset.id == reference,
            Self::ExactName => asset.name == reference,
            Self::CaseInsensitiveName => asset.name.to_lowercase() == reference.to_lowercase(),
            Self::Substring => asset
                .name
                .to_lowercase()
                .contains(&reference.to_lowercase()),
        }
    }

    async fn find(
        &self,
        store: &dyn AssetStore,
        shop: &str,
        reference: &str,
        shop_assets: &mut Option<Vec<Asset>>,
    ) -> Result<Option<Asset>> {
        match self {
            Self::ExactId => Ok(store
                .find_by_id(reference)
                .await?
                .filter(|asset| asset.shop == shop)),
            Self::ExactName => store.find_by_exact_name(shop, reference).await,
            Self::CaseInsensitiveName | Self::Substring => {
                if shop_assets.is_none() {
                    *shop_assets = Some(store.list_by_shop(shop).await?);
                }
                Ok(shop_assets
                    .iter()
                    .flatten()
                    .find(|asset| self.matches(asset, reference))
                    .cloned())
            }
        }
    }
}

/// Resolves `reference` (an id or a name) to an asset of `shop`.
///
/// # Errors
///
/// Returns `NotFound` only when every strategy misses.
pub async fn resolve_asset(
    store: &dyn AssetStore,
    shop: &str,
    reference: &str,
) -> Result<(Asset, ResolutionStrategy)> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(CustomflyError::validation("asset reference is empty"));
    }

    let mut shop_assets = None;
    for strategy in ResolutionStrategy::ORDER {
        if let Some(asset) = strategy
            .find(store, shop, reference, &mut shop_assets)
            .await?
        {
            tracing::debug!(
                target: "customfly::resolver",
                shop,
                reference,
                asset_id = %asset.id,
                strategy = %strategy,
                "Resolved asset reference"
            );
            return Ok((asset, strategy));
        }
    }

    Err(CustomflyError::not_found("asset", reference))
}
