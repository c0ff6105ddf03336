use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::form::{EmployeeDraft, ImageAttachment};
use super::session::Session;
use super::ClientError;
use crate::models::employee::Employee;

#[derive(Deserialize, Default)]
struct Envelope {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    token: Option<String>,
    employee: Option<Employee>,
    employees: Option<Vec<Employee>>,
}

/// Thin wrapper over the HTTP API. The token always comes from the
/// [`Session`] passed in.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(backend_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(backend_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn authorized(&self, builder: RequestBuilder, session: &Session) -> Result<RequestBuilder, ClientError> {
        Ok(builder.bearer_auth(session.token()?))
    }

    async fn envelope(response: Response) -> Result<Envelope, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&bytes).unwrap_or_default();

        if !status.is_success() || !envelope.success {
            let message = envelope
                .message
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(envelope)
    }

    fn missing(field: &str) -> ClientError {
        ClientError::Invalid(format!("Response is missing '{}'", field))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("api/login")?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::envelope(response).await?.token.ok_or_else(|| Self::missing("token"))
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Employee>, ClientError> {
        let request = self.authorized(self.http.get(self.url("api/employee/list")?), session)?;
        let envelope = Self::envelope(request.send().await?).await?;
        envelope.employees.ok_or_else(|| Self::missing("employees"))
    }

    pub async fn get(&self, session: &Session, id: &str) -> Result<Employee, ClientError> {
        let url = self.url(&format!("api/employee/list/{}", id))?;
        let request = self.authorized(self.http.get(url), session)?;
        let envelope = Self::envelope(request.send().await?).await?;
        envelope.employee.ok_or_else(|| Self::missing("employee"))
    }

    pub async fn create(
        &self,
        session: &Session,
        draft: &EmployeeDraft,
        image: ImageAttachment,
    ) -> Result<Employee, ClientError> {
        let form = employee_form(draft, Some(image))?;
        let request = self.authorized(self.http.post(self.url("api/employee/create")?), session)?;
        let envelope = Self::envelope(request.multipart(form).send().await?).await?;
        envelope.employee.ok_or_else(|| Self::missing("employee"))
    }

    pub async fn update(
        &self,
        session: &Session,
        id: &str,
        draft: &EmployeeDraft,
        image: Option<ImageAttachment>,
    ) -> Result<Employee, ClientError> {
        let form = employee_form(draft, image)?;
        let url = self.url(&format!("api/employee/update/{}", id))?;
        let request = self.authorized(self.http.put(url), session)?;
        let envelope = Self::envelope(request.multipart(form).send().await?).await?;
        envelope.employee.ok_or_else(|| Self::missing("employee"))
    }

    pub async fn delete(&self, session: &Session, id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("api/employee/delete/{}", id))?;
        let request = self.authorized(self.http.delete(url), session)?;
        Self::envelope(request.send().await?).await?;
        Ok(())
    }
}

fn employee_form(draft: &EmployeeDraft, image: Option<ImageAttachment>) -> Result<Form, ClientError> {
    let mut form = Form::new()
        .text("f_Name", draft.name.clone())
        .text("f_Email", draft.email.clone())
        .text("f_Mobile", draft.mobile.clone())
        .text("f_Designation", draft.designation.clone())
        .text("f_gender", draft.gender.clone())
        .text("f_Course", serde_json::to_string(&draft.courses)?);

    if let Some(image) = image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)?;
        form = form.part("f_Image", part);
    }
    Ok(form)
}
