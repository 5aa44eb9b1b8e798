//! Wi-Fi link and HTTPS transport
//!
//! The CYW43439 radio and the embassy-net stack each run as their own task.
//! [`WifiLink`] and [`HttpsTransport`] share the stack handle and implement
//! the core network traits on top of it.

use cyw43::JoinOptions;
use cyw43_pio::PioSpi;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::Stack;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{with_timeout, Duration};
use quotedial_core::traits::{
    Credentials, HttpResponse, LinkError, NetworkLink, QuoteTransport, TransportError,
};
use quotedial_protocol::{ACCEPT_JSON, USER_AGENT};
use rand_core::RngCore;
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::{Method, RequestBuilder};

/// Upper bound on one association attempt
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// TLS record buffers; reads must hold a full 16 KiB record
pub const TLS_READ_BUFFER: usize = 16_640;
pub const TLS_WRITE_BUFFER: usize = 8192;

/// Response headers plus body
pub const RX_BUFFER: usize = 4096;

/// One connection with 4 KiB socket buffers each way
pub type ClientState = TcpClientState<1, 4096, 4096>;

/// Radio driver task
#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// Network stack task
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Station-mode Wi-Fi link
pub struct WifiLink {
    control: cyw43::Control<'static>,
    stack: Stack<'static>,
}

impl WifiLink {
    pub fn new(control: cyw43::Control<'static>, stack: Stack<'static>) -> Self {
        Self { control, stack }
    }
}

impl NetworkLink for WifiLink {
    fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }

    async fn begin(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        let options = JoinOptions::new(credentials.password().as_bytes());
        // DHCP finishes in the background; the guard polls for it
        match with_timeout(JOIN_TIMEOUT, self.control.join(credentials.ssid(), options)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(LinkError::JoinFailed),
        }
    }
}

/// HTTPS GET over the embassy-net stack
///
/// Certificates are not verified; the quote payload is public data and the
/// board has no trust store.
pub struct HttpsTransport {
    stack: Stack<'static>,
    tcp_state: &'static ClientState,
    tls_read: &'static mut [u8; TLS_READ_BUFFER],
    tls_write: &'static mut [u8; TLS_WRITE_BUFFER],
    rx: &'static mut [u8; RX_BUFFER],
    rng: RoscRng,
}

impl HttpsTransport {
    pub fn new(
        stack: Stack<'static>,
        tcp_state: &'static ClientState,
        tls_read: &'static mut [u8; TLS_READ_BUFFER],
        tls_write: &'static mut [u8; TLS_WRITE_BUFFER],
        rx: &'static mut [u8; RX_BUFFER],
    ) -> Self {
        Self {
            stack,
            tcp_state,
            tls_read,
            tls_write,
            rx,
            rng: RoscRng,
        }
    }

    async fn fetch(&mut self, url: &str, body: &mut [u8]) -> Result<HttpResponse, TransportError> {
        let seed = self.rng.next_u64();
        let tcp = TcpClient::new(self.stack, self.tcp_state);
        let dns = DnsSocket::new(self.stack);
        let tls = TlsConfig::new(
            seed,
            &mut self.tls_read[..],
            &mut self.tls_write[..],
            TlsVerify::None,
        );
        let mut client = HttpClient::new_with_tls(&tcp, &dns, tls);

        let headers = [("User-Agent", USER_AGENT), ("Accept", ACCEPT_JSON)];
        let mut request = client
            .request(Method::GET, url)
            .await
            .map_err(classify)?
            .headers(&headers);
        let response = request.send(&mut self.rx[..]).await.map_err(classify)?;
        let status = response.status.0;
        // Leave error bodies unread so the status always reaches the caller
        if !(200..300).contains(&status) {
            return Ok(HttpResponse {
                status,
                body_len: 0,
            });
        }

        let payload = response.body().read_to_end().await.map_err(classify)?;
        let out = body
            .get_mut(..payload.len())
            .ok_or(TransportError::BodyTooLarge)?;
        out.copy_from_slice(payload);

        Ok(HttpResponse {
            status,
            body_len: payload.len(),
        })
    }
}

impl QuoteTransport for HttpsTransport {
    async fn get(
        &mut self,
        url: &str,
        timeout_ms: u32,
        body: &mut [u8],
    ) -> Result<HttpResponse, TransportError> {
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        with_timeout(timeout, self.fetch(url, body))
            .await
            .map_err(|_| TransportError::Timeout)?
    }
}

fn classify(e: reqwless::Error) -> TransportError {
    match e {
        reqwless::Error::Dns => TransportError::Dns,
        reqwless::Error::Tls(_) => TransportError::Tls,
        reqwless::Error::BufferTooSmall => TransportError::BodyTooLarge,
        reqwless::Error::Network(_) | reqwless::Error::ConnectionAborted => {
            TransportError::Connect
        }
        _ => TransportError::Request,
    }
}
