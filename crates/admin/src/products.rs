//! Product management: edit buffer, multipart save and guarded delete.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use kkomi_core::{Page, Price, PriceError, Product, ProductId};
use kkomi_storefront::api::{ApiClient, ApiError, UploadMethod};
use kkomi_storefront::catalog;
use reqwest::multipart::{Form, Part};
use tracing::{info, instrument};

use crate::error::AdminError;

const PRODUCTS_ENDPOINT: &str = "products";

// =============================================================================
// Image upload
// =============================================================================

/// An image file chosen for a product.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read an image from disk, guessing its content type from the
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Image`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, AdminError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AdminError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, mime_for(path), bytes))
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn to_part(&self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| ApiError::Multipart {
                field: "image".to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// Form
// =============================================================================

/// Field name to validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map_or(&[], Vec::as_slice)
    }

    /// All messages joined into one line, in field-name order.
    #[must_use]
    pub fn flattened(&self) -> String {
        self.0
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flattened())
    }
}

/// Where a saved form goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductTarget {
    /// Create a product.
    New,
    /// Update the product with this id.
    Existing(ProductId),
}

impl ProductTarget {
    fn endpoint(self) -> String {
        match self {
            Self::New => PRODUCTS_ENDPOINT.to_string(),
            Self::Existing(id) => format!("{PRODUCTS_ENDPOINT}/{id}"),
        }
    }

    const fn method(self) -> UploadMethod {
        match self {
            Self::New => UploadMethod::Post,
            Self::Existing(_) => UploadMethod::Put,
        }
    }
}

/// Edit buffer for a product. Fields hold raw text as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    /// A newly chosen image. `None` keeps the current one.
    pub image: Option<ImageUpload>,
    current_image_url: Option<String>,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
}

impl ProductForm {
    /// An empty form for a new product.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// A form pre-filled from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            image: None,
            current_image_url: product.image_url.clone(),
        }
    }

    /// Image path of the product being edited, if it has one.
    #[must_use]
    pub fn current_image_url(&self) -> Option<&str> {
        self.current_image_url.as_deref()
    }

    /// Check the fields.
    ///
    /// # Errors
    ///
    /// Returns every problem found, keyed by field.
    pub fn validate(&self) -> Result<ValidProduct, FormErrors> {
        let mut errors = FormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Nama produk wajib diisi.");
        }

        let price = match Price::parse(&self.price) {
            Ok(price) => Some(price),
            Err(PriceError::Empty) => {
                errors.add("price", "Harga wajib diisi.");
                None
            }
            Err(PriceError::NotANumber(_)) => {
                errors.add("price", "Harga harus berupa angka.");
                None
            }
            Err(PriceError::Negative) => {
                errors.add("price", "Harga tidak boleh negatif.");
                None
            }
        };

        let stock = self.stock.trim();
        let stock = if stock.is_empty() {
            errors.add("stock", "Stok wajib diisi.");
            None
        } else if let Ok(stock) = stock.parse::<u32>() {
            Some(stock)
        } else {
            errors.add("stock", "Stok harus berupa bilangan bulat tidak negatif.");
            None
        };

        match (price, stock) {
            (Some(price), Some(stock)) if errors.is_empty() => {
                let description = self.description.trim();
                Ok(ValidProduct {
                    name: name.to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                    price,
                    stock,
                })
            }
            _ => Err(errors),
        }
    }

    fn to_multipart(&self, valid: &ValidProduct) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text("name", valid.name.clone())
            .text("description", valid.description.clone().unwrap_or_default())
            .text("price", valid.price.to_string())
            .text("stock", valid.stock.to_string());
        if let Some(image) = &self.image {
            form = form.part("image", image.to_part()?);
        }
        Ok(form)
    }
}

// =============================================================================
// Operations
// =============================================================================

/// List the first page of products.
///
/// # Errors
///
/// Returns the API error unchanged.
pub async fn fetch_products(api: &ApiClient) -> Result<Page<Product>, ApiError> {
    catalog::fetch_products(api, None, None).await
}

/// Create or update a product.
///
/// Always sent as multipart, with or without a new image, so one path
/// handles both.
///
/// # Errors
///
/// Returns [`AdminError::Invalid`] without contacting the backend when the
/// form does not validate, otherwise the API error.
#[instrument(skip(api, form), fields(image = form.image.is_some()))]
pub async fn save_product(
    api: &ApiClient,
    target: ProductTarget,
    form: &ProductForm,
) -> Result<Option<Product>, AdminError> {
    let valid = form.validate().map_err(AdminError::Invalid)?;
    let body = form.to_multipart(&valid)?;

    let saved: Option<Product> = api
        .upload(target.method(), &target.endpoint(), body)
        .await?;

    info!(
        product_id = saved.as_ref().map(|p| p.id.as_i64()),
        "Product saved"
    );
    Ok(saved)
}

/// `DELETE /products/{id}`.
///
/// # Errors
///
/// Returns the API error unchanged.
#[instrument(skip(api))]
pub async fn delete_product(api: &ApiClient, id: ProductId) -> Result<(), ApiError> {
    api.delete::<serde_json::Value>(&format!("{PRODUCTS_ENDPOINT}/{id}"))
        .await?;
    info!("Product deleted");
    Ok(())
}

// =============================================================================
// Delete guard
// =============================================================================

/// Two-phase delete: choose a product, then confirm.
///
/// Nothing is sent until [`confirm`](Self::confirm). The guard is empty again
/// after a cancel or after the delete completes, whatever the result.
#[derive(Debug, Default)]
pub struct DeleteGuard {
    pending: Option<Product>,
}

impl DeleteGuard {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Open the confirmation for `product`, replacing any earlier choice.
    pub fn request(&mut self, product: Product) {
        self.pending = Some(product);
    }

    /// Close the confirmation without deleting.
    pub fn cancel(&mut self) -> Option<Product> {
        self.pending.take()
    }

    /// The product awaiting confirmation.
    #[must_use]
    pub const fn pending(&self) -> Option<&Product> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Confirmation question for the pending product.
    #[must_use]
    pub fn prompt(&self) -> Option<String> {
        self.pending.as_ref().map(|p| {
            format!(
                "Apakah Anda yakin ingin menghapus produk \"{}\"? Tindakan ini tidak dapat dibatalkan.",
                p.name
            )
        })
    }

    /// Delete the pending product.
    ///
    /// Returns `None` when nothing is pending. Otherwise the guard is reset
    /// and the deleted product (or the error) is returned.
    pub async fn confirm(&mut self, api: &ApiClient) -> Option<Result<Product, ApiError>> {
        let product = self.pending.take()?;
        Some(delete_product(api, product.id).await.map(|()| product))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use kkomi_storefront::config::ClientConfig;
    use kkomi_storefront::session::{MemoryStorage, SessionStore};

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(4),
            name: "Fresh Bread".to_string(),
            description: Some("Roti tawar".to_string()),
            price: Price::parse("15000.00").unwrap(),
            stock: 12,
            image_url: Some("/storage/products/bread.jpg".to_string()),
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn offline_api() -> ApiClient {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig::for_base_url(&format!("http://127.0.0.1:{port}/api")).unwrap();
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).unwrap();
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_from_product_prefills() {
        let form = ProductForm::from_product(&product());
        assert_eq!(form.name, "Fresh Bread");
        assert_eq!(form.description, "Roti tawar");
        assert_eq!(form.price, "15000.00");
        assert_eq!(form.stock, "12");
        assert_eq!(form.current_image_url(), Some("/storage/products/bread.jpg"));
        assert!(form.image.is_none());
    }

    #[test]
    fn test_valid_form() {
        let form = ProductForm {
            name: "  Melon Juice ".to_string(),
            description: "   ".to_string(),
            price: "20000".to_string(),
            stock: "5".to_string(),
            ..ProductForm::blank()
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.name, "Melon Juice");
        assert_eq!(valid.description, None);
        assert_eq!(valid.price, Price::from_rupiah(20_000));
        assert_eq!(valid.stock, 5);
    }

    #[test]
    fn test_blank_form_reports_every_field() {
        let errors = ProductForm::blank().validate().unwrap_err();
        assert_eq!(errors.field("name"), ["Nama produk wajib diisi."]);
        assert_eq!(errors.field("price"), ["Harga wajib diisi."]);
        assert_eq!(errors.field("stock"), ["Stok wajib diisi."]);
        assert!(errors.field("description").is_empty());
    }

    #[test]
    fn test_bad_numbers() {
        let form = ProductForm {
            name: "Melon".to_string(),
            price: "-1".to_string(),
            stock: "2.5".to_string(),
            ..ProductForm::blank()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.flattened(),
            "Harga tidak boleh negatif. Stok harus berupa bilangan bulat tidak negatif."
        );
    }

    #[test]
    fn test_target_routing() {
        assert_eq!(ProductTarget::New.endpoint(), "products");
        assert_eq!(ProductTarget::New.method(), UploadMethod::Post);
        let target = ProductTarget::Existing(ProductId::new(9));
        assert_eq!(target.endpoint(), "products/9");
        assert_eq!(target.method(), UploadMethod::Put);
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for(Path::new("a/b/melon.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("melon.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("melon")), "application/octet-stream");
    }

    #[test]
    fn test_bad_mime_is_reported() {
        let form = ProductForm {
            name: "Melon".to_string(),
            price: "1".to_string(),
            stock: "1".to_string(),
            image: Some(ImageUpload::new("x.png", "not a mime", vec![1, 2, 3])),
            ..ProductForm::blank()
        };
        let valid = form.validate().unwrap();
        let err = form.to_multipart(&valid).unwrap_err();
        assert!(matches!(err, ApiError::Multipart { ref field, .. } if field == "image"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let api = offline_api();
        let err = save_product(&api, ProductTarget::New, &ProductForm::blank())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_delete_guard_phases() {
        let api = offline_api();
        let mut guard = DeleteGuard::new();

        assert!(guard.confirm(&api).await.is_none());

        guard.request(product());
        assert!(guard.is_open());
        assert!(guard.prompt().unwrap().contains("\"Fresh Bread\""));
        assert_eq!(guard.cancel().map(|p| p.id), Some(ProductId::new(4)));
        assert!(!guard.is_open());

        guard.request(product());
        let result = guard.confirm(&api).await.unwrap();
        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert!(!guard.is_open(), "guard resets after a failed delete");
    }
}
