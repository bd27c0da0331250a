pub mod dashboard;
pub mod json;
pub mod settings;

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
};

use log::{debug, trace};

use thiserror::Error;

use tokio::net::UdpSocket;

use crate::{archive, pvt::PvtRecord};

/// Largest datagram we accept (one Ethernet MTU)
pub const MAX_DATAGRAM_SIZE: usize = 1500;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Presents decoded [PvtRecord]s
pub trait Renderer {
    /// Static content, drawn once before any record
    fn render_header(&mut self) -> io::Result<()>;

    /// Refreshes the view with a new [PvtRecord]
    fn render_record(&mut self, record: &PvtRecord) -> io::Result<()>;
}

/// Passive PVT monitor: receives one datagram at a time,
/// and renders every record that decodes correctly.
pub struct Monitor {
    socket: UdpSocket,
    buffer: [u8; MAX_DATAGRAM_SIZE],
    decoded: u64,
    dropped: u64,
}

impl Monitor {
    /// Binds a new [Monitor] to given port, on all IPv4 interfaces
    pub async fn bind(port: u16) -> Result<Self, Error> {
        let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);

        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| Error::Bind { port, source })?;

        debug!("bound to {}", addr);

        Ok(Self {
            socket,
            buffer: [0; MAX_DATAGRAM_SIZE],
            decoded: 0,
            dropped: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    /// Waits (possibly forever) for the next datagram
    pub async fn receive_one(&mut self) -> Result<&[u8], Error> {
        let (size, peer) = self.socket.recv_from(&mut self.buffer).await?;
        trace!("{} bytes from {}", size, peer);
        Ok(&self.buffer[..size])
    }

    /// Draws the header, then renders incoming records until an I/O error occurs.
    pub async fn run<R: Renderer>(&mut self, renderer: &mut R) -> Result<(), Error> {
        renderer.render_header()?;

        loop {
            trace!("awaiting packet");

            let rendered = {
                let bytes = self.receive_one().await?;
                process(bytes, renderer)?
            };

            match rendered {
                Some(record) => {
                    self.decoded += 1;
                    debug!("{}", record);
                },
                None => {
                    self.dropped += 1;
                },
            }
        }
    }

    /// Number of (rendered, dropped) datagrams so far
    pub fn statistics(&self) -> (u64, u64) {
        (self.decoded, self.dropped)
    }
}

/// Decodes one datagram and renders it on success.
/// Datagrams that do not decode are dropped without touching the view.
pub fn process<R: Renderer>(bytes: &[u8], renderer: &mut R) -> io::Result<Option<PvtRecord>> {
    match archive::decode(bytes) {
        Ok(record) => {
            trace!("rendering");
            renderer.render_record(&record)?;
            Ok(Some(record))
        },
        Err(e) => {
            debug!("dropped {} byte datagram: {}", bytes.len(), e);
            Ok(None)
        },
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::net::UdpSocket;

    use super::{dashboard::Dashboard, process, Error, Monitor, Renderer};
    use crate::{archive, pvt::PvtRecord};

    fn record() -> PvtRecord {
        PvtRecord {
            tow_at_current_symbol_ms: 123456,
            week: 2200,
            rx_time: 345600.5,
            pos_x: -2694685.47,
            pos_y: -4293642.44,
            pos_z: 3857878.93,
            valid_sats: 9,
            ..Default::default()
        }
    }

    fn rendered(record: &PvtRecord) -> Vec<u8> {
        let mut dashboard = Dashboard::new(Vec::new());
        dashboard.render_record(record).unwrap();
        dashboard.into_inner()
    }

    #[test]
    fn garbage_leaves_view_untouched() {
        let mut dashboard = Dashboard::new(Vec::new());

        assert_eq!(process(&[0x3a, 0x11, 0xfe], &mut dashboard).unwrap(), None);
        assert_eq!(process(&[], &mut dashboard).unwrap(), None);

        assert!(dashboard.into_inner().is_empty());
    }

    #[test]
    fn failure_then_success() {
        let bytes = archive::encode(&record());

        let mut dashboard = Dashboard::new(Vec::new());

        assert_eq!(process(&bytes[..100], &mut dashboard).unwrap(), None);
        assert_eq!(process(&bytes, &mut dashboard).unwrap(), Some(record()));

        assert_eq!(dashboard.into_inner(), rendered(&record()));
    }

    #[tokio::test]
    async fn port_already_in_use() {
        let holder = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
        let port = holder.local_addr().unwrap().port();

        match Monitor::bind(port).await {
            Err(Error::Bind { port: p, source }) => {
                assert_eq!(p, port);
                assert_eq!(source.kind(), std::io::ErrorKind::AddrInUse);
            },
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("bound to a port already in use"),
        }
    }

    #[tokio::test]
    async fn receive_one_datagram() {
        let mut monitor = Monitor::bind(0).await.unwrap();
        let port = monitor.local_addr().unwrap().port();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(&[1, 2, 3, 4], ("127.0.0.1", port))
            .await
            .unwrap();

        let bytes = monitor.receive_one().await.unwrap();
        assert_eq!(bytes, &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn monitor_loop() {
        let mut monitor = Monitor::bind(0).await.unwrap();
        let port = monitor.local_addr().unwrap().port();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = ("127.0.0.1", port);

        sender.send_to(&[0x3a, 0x11, 0xfe], target).await.unwrap();
        sender
            .send_to(&archive::encode(&record()), target)
            .await
            .unwrap();

        let mut dashboard = Dashboard::new(Vec::new());

        // the loop never returns on its own
        let ret = tokio::time::timeout(Duration::from_millis(500), monitor.run(&mut dashboard)).await;
        assert!(ret.is_err());

        assert_eq!(monitor.statistics(), (1, 1));

        let mut expected = Dashboard::new(Vec::new());
        expected.render_header().unwrap();
        expected.render_record(&record()).unwrap();

        assert_eq!(dashboard.into_inner(), expected.into_inner());
    }
}
