/*
[INPUT]:  RemoteTask request payloads
[OUTPUT]: TaskAck carrying the task id issued by the compute service
[POS]:    HTTP layer - task submission (no retries)
[UPDATE]: When submission acknowledgement format changes
*/

use crate::http::client::extract_detail;
use crate::http::{EdutaskClient, EdutaskError, RemoteTask, Result};
use crate::types::TaskAck;
use reqwest::Method;
use tracing::{info, warn};

impl EdutaskClient {
    /// Submit a task and return the service's acknowledgement.
    ///
    /// POST {T::SUBMIT_PATH}
    /// One outbound call. Transport failures, non-2xx answers and undecodable
    /// acknowledgements all surface as `EdutaskError::Submission`. A request
    /// failing `RemoteTask::validate` is never sent.
    pub async fn submit<T: RemoteTask>(&self, request: &T) -> Result<TaskAck> {
        let endpoint = T::SUBMIT_PATH;
        if let Err(reason) = request.validate() {
            warn!(task = T::NAME, endpoint, %reason, "task request rejected locally");
            return Err(EdutaskError::InvalidRequest(reason));
        }
        let builder = self.request(Method::POST, endpoint)?.json(request);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(task = T::NAME, endpoint, error = %err, "task submission transport failure");
                return Err(EdutaskError::submission(endpoint, None, err.to_string()));
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| EdutaskError::submission(endpoint, Some(status), err.to_string()))?;

        if !status.is_success() {
            warn!(task = T::NAME, endpoint, status = status.as_u16(), "task submission rejected");
            return Err(EdutaskError::submission(
                endpoint,
                Some(status),
                extract_detail(&body),
            ));
        }

        let ack: TaskAck = serde_json::from_str(&body).map_err(|err| {
            EdutaskError::submission(
                endpoint,
                Some(status),
                format!("invalid acknowledgement: {err}"),
            )
        })?;

        if ack.task_id.is_empty() {
            return Err(EdutaskError::submission(
                endpoint,
                Some(status),
                "acknowledgement carried an empty task_id",
            ));
        }

        info!(
            task = T::NAME,
            task_id = %ack.task_id,
            status = ?ack.status,
            "task submitted"
        );
        Ok(ack)
    }
}
