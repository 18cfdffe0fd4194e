//! User-facing strings.
//!
//! The storefront speaks Indonesian to shoppers and staff. Log messages stay
//! in English; only text meant for a person on the other side of the screen
//! lives here.

/// Shown when the backend could not be reached.
pub const NETWORK_FAILURE: &str = "Tidak dapat terhubung ke server. Silakan coba lagi.";

/// Shown when a request failed without a usable server message.
pub const GENERIC_FAILURE: &str = "Terjadi kesalahan. Silakan coba lagi.";

/// Shown after a successful checkout.
pub const CHECKOUT_SUCCESS: &str = "Checkout berhasil! Terima kasih telah berbelanja.";

/// Fallback when checkout failed without a server message.
pub const CHECKOUT_FAILED: &str = "Checkout gagal. Silakan coba lagi.";

/// Shown to a customer whose token the backend rejected.
pub const SESSION_EXPIRED: &str = "Sesi Anda telah berakhir. Silakan login kembali.";

/// Shown to an admin whose session ended mid-work.
pub const ADMIN_SESSION_EXPIRED: &str =
    "Sesi admin telah berakhir. Anda telah dikeluarkan, silakan login kembali.";

/// Registration form: passwords differ.
pub const PASSWORD_MISMATCH: &str = "Password dan konfirmasi password tidak cocok.";

/// Registration succeeded; the user is sent to the login form.
pub const REGISTER_SUCCESS: &str = "Registrasi berhasil! Silakan login.";

/// Fallback when login failed without a server message.
pub const LOGIN_FAILED: &str = "Login gagal. Periksa email dan password Anda.";

/// Catalog search failed.
pub const PRODUCTS_LOAD_FAILED: &str = "Gagal memuat data produk.";

/// Admin order report failed.
pub const ORDERS_LOAD_FAILED: &str = "Gagal memuat data transaksi.";

/// Admin dashboard statistics failed.
pub const STATS_LOAD_FAILED: &str = "Gagal memuat statistik.";

/// Admin product create/update succeeded.
pub const PRODUCT_SAVED: &str = "Produk berhasil disimpan!";

/// Admin product create/update failed without a server message.
pub const PRODUCT_SAVE_FAILED: &str = "Terjadi kesalahan saat menyimpan produk.";

/// Admin product delete succeeded.
pub const PRODUCT_DELETED: &str = "Produk berhasil dihapus!";

/// Admin product delete failed.
pub const PRODUCT_DELETE_FAILED: &str = "Gagal menghapus produk. Silakan coba lagi.";
