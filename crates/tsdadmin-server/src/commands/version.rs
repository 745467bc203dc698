use async_trait::async_trait;

use tsdadmin_core::Result;

use crate::dispatch::{Command, Services};
use crate::query::HttpQuery;

/// `/version`: build metadata. A URI ending in `json` (e.g. `/version?json`)
/// gets a one-line JSON object, anything else two lines of text.
pub struct Version;

#[async_trait]
impl Command for Version {
    fn name(&self) -> &'static str {
        "version"
    }

    async fn process(&self, svc: &Services, query: &mut HttpQuery) -> Result<()> {
        if query.uri().ends_with("json") {
            query.send_json(svc.build.to_json());
        } else {
            let body = format!(
                "{}\n{}\n",
                svc.build.revision_string(),
                svc.build.build_string()
            );
            query.send_reply(body);
        }
        Ok(())
    }
}
