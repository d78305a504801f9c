mod capture;
mod format;
mod playback;
mod ports;
mod resampler;
mod wav;
