//! `scanfill-browser` — scripts an attached browser tab over the Chrome
//! DevTools Protocol. Provides the production implementation of the page
//! seam; no pipeline logic lives here.

pub mod cdp_client;
pub mod page;

pub use cdp_client::CdpClient;
pub use page::CdpPage;
