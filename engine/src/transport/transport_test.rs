use std::sync::{Arc, Mutex};

use super::*;

#[derive(Default)]
struct RecordingIce {
    candidates: Mutex<Vec<String>>,
    sent: Mutex<Vec<Vec<u8>>>,
    restarts: Mutex<u32>,
}

impl IceTransport for RecordingIce {
    fn add_remote_candidate(&self, candidate: &str) -> Result<()> {
        self.candidates.lock().unwrap().push(candidate.to_string());
        Ok(())
    }

    fn send(&self, bytes: &[u8]) -> Result<()> {
        self.sent.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn restart_ice(&self) -> Result<()> {
        *self.restarts.lock().unwrap() += 1;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct RecordingDtls {
    started_as: Mutex<Option<DtlsRole>>,
}

impl DtlsTransport for RecordingDtls {
    fn start(&self, role: DtlsRole) -> Result<()> {
        *self.started_as.lock().unwrap() = Some(role);
        Ok(())
    }

    fn send(&self, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_ice_transport_contract() {
    let ice = Arc::new(RecordingIce::default());
    let transport: Arc<dyn IceTransport> = ice.clone();
    transport.add_remote_candidate("candidate:1 1 UDP 2 0.0.0.0 9 typ host").unwrap();
    transport.send(b"ping").unwrap();
    transport.restart_ice().unwrap();

    assert_eq!(ice.candidates.lock().unwrap().len(), 1);
    assert_eq!(ice.sent.lock().unwrap().len(), 1);
    assert_eq!(*ice.restarts.lock().unwrap(), 1);
}

#[test]
fn test_dtls_transport_records_role() {
    let dtls = Arc::new(RecordingDtls {
        started_as: Mutex::new(None),
    });
    let transport: Arc<dyn DtlsTransport> = dtls.clone();
    transport.start(DtlsRole::Server).unwrap();

    assert_eq!(*dtls.started_as.lock().unwrap(), Some(DtlsRole::Server));
}
