//! Search dispatch and result polling.

mod client;
mod models;
mod poller;

pub use client::{SearchApiClient, SearchBackend};
pub use models::{
    GeoTag, PollReply, PollState, PostMetadata, PublicMetrics, RawPost, SearchError, SearchJob,
};
pub use poller::{PollError, PollPolicy, Poller};

#[cfg(feature = "mock")]
pub use client::MockSearchBackend;

/// Query used when a search is started with a blank input.
pub const DEFAULT_QUERY: &str = "(tsunami OR flood OR waves OR erosion OR storm OR cyclone OR बाढ़ OR सुनामी OR வெள்ளம் OR వరద OR വെള്ളപ്പൊക്കം OR புயல் OR తుఫాను OR കൊടുങ്കാറ്റ്) lang:en OR lang:hi OR lang:ta OR lang:te OR lang:ml";

pub const DEFAULT_MAX_RESULTS: u32 = 20;
