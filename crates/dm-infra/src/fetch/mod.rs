mod http_asset_fetcher;

pub use http_asset_fetcher::HttpAssetFetcher;
